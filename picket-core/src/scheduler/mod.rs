//! Cooperative tick scheduler
//!
//! [`Rover`] owns every component and runs them in a fixed order each
//! tick: dispatcher, watchdog, heading actuator, safety sampler, motion
//! controller, telemetry. A command applied in one tick is on the
//! outputs by the end of the same tick, and a forced stop pre-empts
//! whatever mode was pending.

mod dispatch;
pub mod rover;

pub use rover::{Rover, RoverHardware};
