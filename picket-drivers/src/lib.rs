//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in `picket-core`,
//! written against `embedded-hal` 1.0 so any HAL can supply the pins:
//!
//! - [`ShiftRegister595`]: 74HC595 direction register
//! - [`PwmGate`] / [`SwitchGate`]: active-low shared enable line
//! - [`Hcsr04`]: ultrasonic pulse-echo ranger
//! - [`HobbyServo`]: 50 Hz position servo

#![no_std]
#![deny(unsafe_code)]

pub mod error;
pub mod gate;
pub mod ranger;
pub mod servo;
pub mod shift_register;

pub use error::DriverError;
pub use gate::{ActiveLevel, PwmGate, SwitchGate};
pub use ranger::{Hcsr04, MicrosClock};
pub use servo::{HobbyServo, ServoTiming};
pub use shift_register::ShiftRegister595;
