//! Board-agnostic control core for the rover
//!
//! This crate contains all control logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (direction register, enable gate,
//!   servo, echo sensor, line sink)
//! - Motion mode state and the motion controller with tier emulation
//! - Range monitoring with the debounced safety stop
//! - Heading actuator settle/sweep logic
//! - Host link watchdog
//! - Telemetry snapshots
//! - The cooperative tick scheduler tying it all together
//! - Configuration types and the embedded config parser

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod motion;
pub mod safety;
pub mod scan;
pub mod scheduler;
pub mod state;
pub mod telemetry;
pub mod traits;

/// Firmware version reported in the boot banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
