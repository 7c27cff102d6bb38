//! Application configuration: TOML-based, platform-aware paths.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::attrs::{self, Attribute};
use crate::mode::{self, DEFAULT_INTERVAL_MS, IFNAMSIZ, Mode};
use crate::trigger::NetdevTrigger;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str =
    "# netled configuration. Changes made outside netled may be overwritten.\n\n";

/// Bounds for how often the sysfs watcher samples interfaces.
pub const EVENT_POLL_MIN_MS: u64 = 10;
pub const EVENT_POLL_MAX_MS: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the sysfs class tree holding `leds/` and `net/`. Default: "/sys/class".
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: String,

    /// How often to sample interfaces for lifecycle changes, in ms. Default: 250.
    #[serde(default = "default_event_poll_ms")]
    pub event_poll_ms: u64,

    /// LED → interface bindings.
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// One LED bound to one interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// LED name under `<sysfs_root>/leds`.
    pub led: String,

    /// Interface to monitor. Empty = unbound.
    #[serde(default)]
    pub device_name: String,

    /// Space-separated subset of "link tx rx". Default: "link".
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Blink interval in ms, 5..=10000. Default: 50.
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_sysfs_root() -> String {
    "/sys/class".into()
}
fn default_event_poll_ms() -> u64 {
    250
}
fn default_mode() -> String {
    Mode::default().to_string()
}
fn default_interval() -> u64 {
    DEFAULT_INTERVAL_MS as u64
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sysfs_root: default_sysfs_root(),
            event_poll_ms: default_event_poll_ms(),
            bindings: Vec::new(),
        }
    }
}

impl Binding {
    pub fn new(led: &str, device_name: &str) -> Self {
        Binding {
            led: led.into(),
            device_name: device_name.into(),
            mode: default_mode(),
            interval: default_interval(),
        }
    }

    /// Push this binding into a freshly activated trigger.
    ///
    /// Mode and interval go first so the bind evaluates the final baseline.
    pub fn apply(&self, trigger: &NetdevTrigger) -> crate::error::Result<()> {
        attrs::store(trigger, Attribute::Mode, &self.mode)?;
        attrs::store(trigger, Attribute::Interval, &self.interval.to_string())?;
        attrs::store(trigger, Attribute::DeviceName, &self.device_name)?;
        Ok(())
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `event_poll_ms` is outside the accepted range.
    EventPollOutOfRange(u64),
    /// A binding has an empty `led` (`index` is 0-based).
    EmptyLedName { index: usize },
    /// Two bindings name the same LED.
    DuplicateLed(String),
    /// `device_name` does not fit an interface name.
    DeviceNameTooLong { led: String, name: String },
    /// `mode` contains an unknown word.
    InvalidMode { led: String, reason: String },
    /// `interval` is outside 5..=10000 ms.
    IntervalOutOfRange { led: String, value: u64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EventPollOutOfRange(v) => write!(
                f,
                "event_poll_ms = {v} is out of range ({EVENT_POLL_MIN_MS}-{EVENT_POLL_MAX_MS})"
            ),
            ValidationError::EmptyLedName { index } => {
                write!(f, "bindings[{index}]: led name is empty")
            }
            ValidationError::DuplicateLed(led) => {
                write!(f, "LED \"{led}\" is bound more than once")
            }
            ValidationError::DeviceNameTooLong { led, name } => write!(
                f,
                "{led}: device_name \"{name}\" is too long (max {} bytes)",
                IFNAMSIZ - 1
            ),
            ValidationError::InvalidMode { led, reason } => {
                write!(f, "{led}: invalid mode: {reason}")
            }
            ValidationError::IntervalOutOfRange { led, value } => write!(
                f,
                "{led}: interval {value} ms is out of range ({}-{})",
                mode::INTERVAL_MIN_MS,
                mode::INTERVAL_MAX_MS
            ),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("netled"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    pub fn sysfs_root(&self) -> PathBuf {
        PathBuf::from(&self.sysfs_root)
    }

    /// Save config to an arbitrary path atomically (write to temp file, then rename).
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Save config to the default platform path.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config directory",
            ));
        };
        self.save_to(&path)
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !(EVENT_POLL_MIN_MS..=EVENT_POLL_MAX_MS).contains(&self.event_poll_ms) {
            errors.push(ValidationError::EventPollOutOfRange(self.event_poll_ms));
        }

        let mut seen = HashSet::new();
        for (index, b) in self.bindings.iter().enumerate() {
            let led = b.led.trim();
            if led.is_empty() {
                errors.push(ValidationError::EmptyLedName { index });
            } else if !seen.insert(led) {
                errors.push(ValidationError::DuplicateLed(led.to_string()));
            }

            if b.device_name.len() >= IFNAMSIZ {
                errors.push(ValidationError::DeviceNameTooLong {
                    led: led.to_string(),
                    name: b.device_name.clone(),
                });
            }
            if let Err(e) = Mode::parse(&b.mode) {
                errors.push(ValidationError::InvalidMode {
                    led: led.to_string(),
                    reason: e.to_string(),
                });
            }
            if !mode::interval_in_bounds(b.interval) {
                errors.push(ValidationError::IntervalOutOfRange {
                    led: led.to_string(),
                    value: b.interval,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
