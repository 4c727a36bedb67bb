//! Rover runtime state
//!
//! All mutable control state lives in one owned [`RoverState`] that the
//! scheduler hands to each component in turn. Only the dispatcher, the
//! watchdog and the safety sampler change the motion mode.

pub mod context;
pub mod mode;

pub use context::{DistanceSample, RoverState};
pub use mode::{DrivePlan, MotionMode, Side, SideDirection, SideIntent};
pub use picket_protocol::{StopReason, Tier};
