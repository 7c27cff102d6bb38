//! Unified error type for the netled-lib crate.
//!
//! [`NetledError`] wraps module-specific errors (`TriggerError`, `LedError`)
//! and I/O, plus string-carrying kinds for config and registry problems.

use std::fmt;

use crate::led::LedError;
use crate::trigger::TriggerError;

#[derive(Debug)]
pub enum NetledError {
    /// Rejected trigger configuration (bad name, malformed attribute text).
    Trigger(TriggerError),
    /// LED backend error (missing LED, attribute I/O).
    Led(LedError),
    /// Standard I/O error (config persistence, worker thread spawn).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Trigger registry misuse (duplicate or unknown LED).
    Registry(String),
}

impl fmt::Display for NetledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetledError::Trigger(e) => write!(f, "{e}"),
            NetledError::Led(e) => write!(f, "{e}"),
            NetledError::Io(e) => write!(f, "I/O error: {e}"),
            NetledError::Config(e) => write!(f, "Config error: {e}"),
            NetledError::Registry(e) => write!(f, "Registry error: {e}"),
        }
    }
}

impl std::error::Error for NetledError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetledError::Trigger(e) => Some(e),
            NetledError::Led(e) => Some(e),
            NetledError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TriggerError> for NetledError {
    fn from(e: TriggerError) -> Self {
        NetledError::Trigger(e)
    }
}

impl From<LedError> for NetledError {
    fn from(e: LedError) -> Self {
        NetledError::Led(e)
    }
}

impl From<std::io::Error> for NetledError {
    fn from(e: std::io::Error) -> Self {
        NetledError::Io(e)
    }
}

/// Crate-level Result alias using [`NetledError`].
pub type Result<T> = std::result::Result<T, NetledError>;
