//! Configuration types
//!
//! Rover tuning lives in a small TOML file compiled into the firmware.
//! [`parse_config`] turns it into a validated [`RoverConfig`] without
//! allocating.

pub mod toml;
pub mod types;

pub use self::toml::parse_config;
pub use types::*;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed `[section]` header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value has the wrong type or does not fit
    InvalidValue,
    /// Values parse but contradict each other
    Inconsistent(&'static str),
}
