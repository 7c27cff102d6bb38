//! netled: binds an LED to the link and traffic state of a network interface.

pub mod attrs;
pub mod config;
pub mod error;
pub mod led;
pub mod mode;
pub mod netdev;
pub mod registry;
pub mod task;
pub mod trigger;
pub mod watch;

pub use error::NetledError;
