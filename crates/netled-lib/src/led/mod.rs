//! LED backend: trait the trigger drives, plus sysfs and in-memory backends.

use std::fmt;

mod sysfs;

pub use sysfs::{SysfsLed, list_leds};

/// Brightness level meaning "off".
pub const LED_OFF: u32 = 0;

/// LED backend errors.
#[derive(Debug)]
pub enum LedError {
    /// No LED with this name exists under the backend root.
    NotFound(String),
    /// Reading or writing an LED attribute failed.
    Io(String),
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedError::NotFound(name) => write!(f, "LED not found: {name}"),
            LedError::Io(e) => write!(f, "LED I/O failed: {e}"),
        }
    }
}

impl std::error::Error for LedError {}

pub type Result<T> = std::result::Result<T, LedError>;

/// An LED the trigger can drive.
///
/// The trigger never owns the LED; it only calls into it. Implementations
/// must be usable from the configuration, notification and polling threads
/// at once.
pub trait Led: Send + Sync {
    /// Stable name used to key the trigger registry.
    fn name(&self) -> &str;
    /// Set a steady (non-blinking) brightness.
    fn set_brightness(&self, level: u32);
    /// Current instantaneous brightness.
    fn brightness(&self) -> u32;
    fn max_brightness(&self) -> u32;
    /// Start a single on/off pulse. With `invert` the LED is off for
    /// `on_ms` first, then back on for `off_ms`.
    fn blink_oneshot(&self, on_ms: u32, off_ms: u32, invert: bool);
    /// Cancel any in-flight one-shot blink.
    fn stop_blink(&self);
}

/// In-memory LED for unit and integration tests.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Calls recorded by [`MockLed`], in order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LedCall {
        SetBrightness(u32),
        BlinkOneshot { on_ms: u32, off_ms: u32, invert: bool },
        StopBlink,
    }

    pub struct MockLed {
        name: String,
        max: u32,
        brightness: Mutex<u32>,
        /// Every call made through the [`Led`] trait.
        pub calls: Mutex<Vec<LedCall>>,
    }

    impl MockLed {
        pub fn new(name: &str, max: u32) -> Self {
            MockLed {
                name: name.into(),
                max,
                brightness: Mutex::new(LED_OFF),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Simulate a manual brightness change without recording a call.
        pub fn force_brightness(&self, level: u32) {
            *self.brightness.lock().unwrap() = level;
        }

        pub fn calls(&self) -> Vec<LedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn clear_calls(&self) {
            self.calls.lock().unwrap().clear();
        }

        /// One-shot blinks recorded so far.
        pub fn blinks(&self) -> Vec<LedCall> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, LedCall::BlinkOneshot { .. }))
                .collect()
        }

        /// The most recent steady brightness written, if any.
        pub fn last_steady(&self) -> Option<u32> {
            self.calls().into_iter().rev().find_map(|c| match c {
                LedCall::SetBrightness(level) => Some(level),
                _ => None,
            })
        }

        fn record(&self, call: LedCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl Led for MockLed {
        fn name(&self) -> &str {
            &self.name
        }

        fn set_brightness(&self, level: u32) {
            *self.brightness.lock().unwrap() = level.min(self.max);
            self.record(LedCall::SetBrightness(level));
        }

        fn brightness(&self) -> u32 {
            *self.brightness.lock().unwrap()
        }

        fn max_brightness(&self) -> u32 {
            self.max
        }

        fn blink_oneshot(&self, on_ms: u32, off_ms: u32, invert: bool) {
            self.record(LedCall::BlinkOneshot {
                on_ms,
                off_ms,
                invert,
            });
        }

        fn stop_blink(&self) {
            self.record(LedCall::StopBlink);
        }
    }
}
