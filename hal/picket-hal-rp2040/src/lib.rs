//! RP2040 board support for the rover firmware
//!
//! - Pin map and PWM slice allocation, including the boot-time check for
//!   gate/servo timer contention
//! - PWM channel wrapper implementing `embedded_hal::pwm::SetDutyCycle`
//! - Microsecond clock for the ultrasonic ranger

#![no_std]

pub mod board;
pub mod clock;
pub mod pwm;

pub use board::{pwm_slice, PinMap, PINS, UART_BAUD};
pub use clock::UptimeMicros;
pub use pwm::{gate_config, servo_config, PwmOutput, SliceChannel};
