//! Drive train control
//!
//! The motion controller is the only writer of the direction register
//! and the shared enable gate. Each tick it turns the current
//! [`MotionMode`](crate::state::MotionMode) into channel directions and a
//! gate duty, emulating per-side speed tiers the single gate cannot
//! express.

pub mod channel;
pub mod controller;

pub use channel::{ChannelDrive, ChannelMap, MotorChannel, CHANNEL_COUNT};
pub use controller::MotionController;
