//! Text attribute surface: `show`/`store` the way sysfs attribute files behave.

use std::fmt;
use std::str::FromStr;

use crate::mode::{self, Flag, IFNAMSIZ, Mode};
use crate::trigger::{NetdevTrigger, Result, TriggerError};

/// Operator-facing attributes of a netdev trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    DeviceName,
    Link,
    Tx,
    Rx,
    Mode,
    Interval,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::DeviceName,
        Attribute::Link,
        Attribute::Tx,
        Attribute::Rx,
        Attribute::Mode,
        Attribute::Interval,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::DeviceName => "device_name",
            Attribute::Link => "link",
            Attribute::Tx => "tx",
            Attribute::Rx => "rx",
            Attribute::Mode => "mode",
            Attribute::Interval => "interval",
        }
    }

    fn flag(self) -> Option<Flag> {
        match self {
            Attribute::Link => Some(Flag::Link),
            Attribute::Tx => Some(Flag::Tx),
            Attribute::Rx => Some(Flag::Rx),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self> {
        Attribute::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| TriggerError::UnknownAttribute(s.to_string()))
    }
}

/// Read an attribute. The text always ends in a newline.
pub fn show(trigger: &NetdevTrigger, attr: Attribute) -> String {
    match attr {
        Attribute::DeviceName => format!("{}\n", trigger.device_name()),
        Attribute::Mode => format!("{}\n", trigger.mode()),
        Attribute::Interval => format!("{}\n", trigger.interval_ms()),
        Attribute::Link | Attribute::Tx | Attribute::Rx => {
            let on = attr.flag().is_some_and(|f| trigger.flag(f));
            format!("{}\n", u8::from(on))
        }
    }
}

/// Write an attribute. Returns the number of bytes consumed.
///
/// Invalid text is rejected with the trigger unchanged. An interval outside
/// [5, 10000] ms is consumed without effect.
pub fn store(trigger: &NetdevTrigger, attr: Attribute, text: &str) -> Result<usize> {
    match attr {
        Attribute::DeviceName => {
            // Length check counts the newline, as the attribute file does
            if text.len() >= IFNAMSIZ {
                return Err(TriggerError::InvalidInput(format!(
                    "device name too long ({} bytes, max {})",
                    text.len(),
                    IFNAMSIZ - 1
                )));
            }
            let name = text.strip_suffix('\n').unwrap_or(text);
            trigger.set_device_name(name)?;
        }
        Attribute::Link | Attribute::Tx | Attribute::Rx => {
            let enabled = mode::parse_ulong(text)? != 0;
            if let Some(flag) = attr.flag() {
                trigger.set_flag(flag, enabled);
            }
        }
        Attribute::Mode => {
            trigger.set_mode(Mode::parse(text)?);
        }
        Attribute::Interval => {
            let ms = mode::parse_ulong(text)?;
            trigger.set_interval(ms);
        }
    }
    Ok(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::mock::MockLed;
    use crate::netdev::mock::{MockNetDevice, MockRegistry};
    use std::sync::Arc;

    fn trigger() -> NetdevTrigger {
        let reg = Arc::new(MockRegistry::new());
        reg.insert(MockNetDevice::new("eth0", true));
        NetdevTrigger::new(Arc::new(MockLed::new("t", 1)), reg).unwrap()
    }

    #[test]
    fn attribute_names_roundtrip() {
        for a in Attribute::ALL {
            assert_eq!(a.name().parse::<Attribute>().unwrap(), a);
        }
        assert!(matches!(
            "brightness".parse::<Attribute>(),
            Err(TriggerError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn show_defaults() {
        let t = trigger();
        assert_eq!(show(&t, Attribute::DeviceName), "\n");
        assert_eq!(show(&t, Attribute::Link), "1\n");
        assert_eq!(show(&t, Attribute::Tx), "0\n");
        assert_eq!(show(&t, Attribute::Rx), "0\n");
        assert_eq!(show(&t, Attribute::Mode), "link\n");
        assert_eq!(show(&t, Attribute::Interval), "50\n");
    }

    #[test]
    fn store_device_name_strips_newline() {
        let t = trigger();
        assert_eq!(store(&t, Attribute::DeviceName, "eth0\n").unwrap(), 5);
        assert_eq!(show(&t, Attribute::DeviceName), "eth0\n");
        assert!(t.snapshot().bound);
    }

    #[test]
    fn store_device_name_counts_newline_against_limit() {
        let t = trigger();
        // 15 characters + newline = 16 bytes: rejected
        let err = store(&t, Attribute::DeviceName, "abcdefghijklmno\n").unwrap_err();
        assert!(matches!(err, TriggerError::InvalidInput(_)));
        assert_eq!(show(&t, Attribute::DeviceName), "\n");
        // Without the newline it fits
        store(&t, Attribute::DeviceName, "abcdefghijklmno").unwrap();
    }

    #[test]
    fn store_flags() {
        let t = trigger();
        store(&t, Attribute::Tx, "1\n").unwrap();
        store(&t, Attribute::Link, "0").unwrap();
        store(&t, Attribute::Rx, "0x2").unwrap();
        assert_eq!(show(&t, Attribute::Mode), "tx rx\n");
        assert!(store(&t, Attribute::Rx, "yes").is_err());
        assert_eq!(show(&t, Attribute::Rx), "1\n");
    }

    #[test]
    fn store_mode_sets_exactly_named_flags() {
        let t = trigger();
        store(&t, Attribute::Mode, "tx rx\n").unwrap();
        assert_eq!(show(&t, Attribute::Link), "0\n");
        assert_eq!(show(&t, Attribute::Tx), "1\n");
        assert_eq!(show(&t, Attribute::Rx), "1\n");

        store(&t, Attribute::Mode, "\n").unwrap();
        assert_eq!(show(&t, Attribute::Mode), "\n");

        assert!(store(&t, Attribute::Mode, "link bogus").is_err());
        assert_eq!(show(&t, Attribute::Mode), "\n");
    }

    #[test]
    fn store_interval_out_of_range_is_accepted_noop() {
        let t = trigger();
        assert_eq!(store(&t, Attribute::Interval, "4\n").unwrap(), 2);
        assert_eq!(store(&t, Attribute::Interval, "10001").unwrap(), 5);
        assert_eq!(show(&t, Attribute::Interval), "50\n");
        store(&t, Attribute::Interval, "250\n").unwrap();
        assert_eq!(show(&t, Attribute::Interval), "250\n");
    }

    #[test]
    fn store_interval_malformed_is_error() {
        let t = trigger();
        let err = store(&t, Attribute::Interval, "fast").unwrap_err();
        assert!(err.to_string().starts_with("Invalid input"));
        assert_eq!(show(&t, Attribute::Interval), "50\n");
    }
}
