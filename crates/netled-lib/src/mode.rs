//! Trigger mode flags, interval bounds and attribute text parsing.

use std::fmt;

use serde::Serialize;

use crate::trigger::{Result, TriggerError};

/// Maximum interface name size, including the terminator.
pub const IFNAMSIZ: usize = 16;

/// Shortest accepted blink interval in milliseconds.
pub const INTERVAL_MIN_MS: u32 = 5;

/// Longest accepted blink interval in milliseconds.
pub const INTERVAL_MAX_MS: u32 = 10_000;

/// Blink interval used when a trigger is activated.
pub const DEFAULT_INTERVAL_MS: u32 = 50;

/// A user-settable mode flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Steady state reflects carrier.
    Link,
    /// Blink on transmitted packets.
    Tx,
    /// Blink on received packets.
    Rx,
}

impl Flag {
    pub const ALL: [Flag; 3] = [Flag::Link, Flag::Tx, Flag::Rx];

    pub fn name(self) -> &'static str {
        match self {
            Flag::Link => "link",
            Flag::Tx => "tx",
            Flag::Rx => "rx",
        }
    }

    fn from_word(word: &str) -> Option<Flag> {
        Flag::ALL.into_iter().find(|f| f.name() == word)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three user flags. `LINK_UP` is derived and lives on the trigger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mode {
    pub link: bool,
    pub tx: bool,
    pub rx: bool,
}

impl Default for Mode {
    fn default() -> Self {
        Mode {
            link: true,
            tx: false,
            rx: false,
        }
    }
}

impl Mode {
    /// No flags enabled.
    pub const NONE: Mode = Mode {
        link: false,
        tx: false,
        rx: false,
    };

    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Link => self.link,
            Flag::Tx => self.tx,
            Flag::Rx => self.rx,
        }
    }

    pub fn set(&mut self, flag: Flag, enabled: bool) {
        match flag {
            Flag::Link => self.link = enabled,
            Flag::Tx => self.tx = enabled,
            Flag::Rx => self.rx = enabled,
        }
    }

    /// Whether the activity poller has anything to watch.
    pub fn wants_activity(&self) -> bool {
        self.tx || self.rx
    }

    /// Parse a whitespace-separated subset of `link`, `tx`, `rx`.
    ///
    /// Named flags are enabled, all others disabled. Empty text disables
    /// everything; an unknown word is rejected.
    pub fn parse(text: &str) -> Result<Mode> {
        let mut mode = Mode::NONE;
        for word in text.split_whitespace() {
            let flag = Flag::from_word(&word.to_ascii_lowercase()).ok_or_else(|| {
                TriggerError::InvalidInput(format!("unknown mode flag \"{word}\""))
            })?;
            mode.set(flag, true);
        }
        Ok(mode)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<&str> = Flag::ALL
            .into_iter()
            .filter(|&flag| self.get(flag))
            .map(Flag::name)
            .collect();
        f.write_str(&words.join(" "))
    }
}

/// Whether `ms` is an acceptable blink interval.
pub fn interval_in_bounds(ms: u64) -> bool {
    (INTERVAL_MIN_MS as u64..=INTERVAL_MAX_MS as u64).contains(&ms)
}

/// Parse an unsigned integer the way attribute files accept them.
///
/// One trailing newline (as `echo` adds) is allowed, as is a single leading
/// `+`. `0x` selects hex, a leading `0` selects octal. Anything else,
/// including other whitespace or a sign after the base prefix, is rejected.
pub fn parse_ulong(text: &str) -> Result<u64> {
    let s = text.strip_suffix('\n').unwrap_or(text);
    let s = s.strip_prefix('+').unwrap_or(s);
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"));
    let (digits, radix) = if let Some(hex) = hex {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(TriggerError::InvalidInput(format!(
            "not an unsigned integer: \"{}\"",
            text.trim_end()
        )));
    }
    u64::from_str_radix(digits, radix)
        .map_err(|_| TriggerError::InvalidInput(format!("out of range: \"{s}\"")))
}
