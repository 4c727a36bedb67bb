//! Hardware abstraction traits
//!
//! These traits define the interface between the control core and
//! board-specific drivers. They are infallible at the seam: a driver that
//! hits a bus error logs it and degrades (a failed echo read is a
//! timeout), so the control loop never unwinds.

pub mod actuator;
pub mod io;

#[cfg(test)]
pub(crate) mod mock;

pub use actuator::{DirectionRegister, EnableGate, ServoOutput};
pub use io::{EchoSensor, LineSink};
