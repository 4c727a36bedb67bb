//! Sensor head positioning
//!
//! The range sensor rides on a hobby servo. A reading is only trusted
//! once the servo has had time to reach its commanded angle, and
//! [`HeadingActuator::is_settled`] is the single place that decides that.

pub mod heading;

pub use heading::HeadingActuator;
