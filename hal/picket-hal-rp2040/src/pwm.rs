//! PWM slice setup for the gate and the servo
//!
//! The servo needs a 50 Hz frame; the gate runs around 2 kHz so the
//! motors see a smooth average. [`SliceChannel`] exposes one output of a
//! slice through `SetDutyCycle`, which is what the drivers consume.

use core::convert::Infallible;

use embassy_rp::pwm::{Config, Pwm};
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

/// Servo frame rate
pub const SERVO_FRAME_HZ: u32 = 50;

/// Integer clock divider for the servo slice
const SERVO_DIVIDER: u8 = 64;

/// Integer clock divider for the gate slice
const GATE_DIVIDER: u8 = 250;

/// Gate counter wrap; compare values 0..=255 map straight onto duty
const GATE_TOP: u16 = 254;

/// Counter wrap for a frame rate at a given system clock and divider
pub const fn top_for(sys_hz: u32, divider: u8, frame_hz: u32) -> u16 {
    let ticks = sys_hz / (frame_hz * divider as u32);
    if ticks == 0 {
        0
    } else if ticks > u16::MAX as u32 + 1 {
        u16::MAX
    } else {
        (ticks - 1) as u16
    }
}

/// Slice configuration for a 50 Hz servo frame
pub fn servo_config(sys_hz: u32) -> Config {
    let mut config = Config::default();
    config.divider = SERVO_DIVIDER.into();
    config.top = top_for(sys_hz, SERVO_DIVIDER, SERVO_FRAME_HZ);
    config.compare_a = 0;
    config.compare_b = 0;
    config
}

/// Slice configuration for the enable gate, starting fully off
///
/// The gate is active low, so "off" holds the output high.
pub fn gate_config() -> Config {
    let mut config = Config::default();
    config.divider = GATE_DIVIDER.into();
    config.top = GATE_TOP;
    config.compare_a = GATE_TOP + 1;
    config.compare_b = GATE_TOP + 1;
    config
}

/// Which output of a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmOutput {
    A,
    B,
}

/// One output of a PWM slice
pub struct SliceChannel {
    pwm: Pwm<'static>,
    config: Config,
    output: PwmOutput,
}

impl SliceChannel {
    pub fn new(pwm: Pwm<'static>, config: Config, output: PwmOutput) -> Self {
        Self {
            pwm,
            config,
            output,
        }
    }
}

impl ErrorType for SliceChannel {
    type Error = Infallible;
}

impl SetDutyCycle for SliceChannel {
    fn max_duty_cycle(&self) -> u16 {
        // compare = top + 1 holds the output high for the whole period
        self.config.top.saturating_add(1)
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        let duty = duty.min(self.max_duty_cycle());
        match self.output {
            PwmOutput::A => self.config.compare_a = duty,
            PwmOutput::B => self.config.compare_b = duty,
        }
        self.pwm.set_config(&self.config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_servo_top_at_125mhz() {
        // 125 MHz / 64 / 50 Hz = 39062.5 ticks per frame
        assert_eq!(top_for(125_000_000, SERVO_DIVIDER, SERVO_FRAME_HZ), 39_061);
    }

    #[test]
    fn test_top_saturates() {
        assert_eq!(top_for(125_000_000, 1, 1), u16::MAX);
        assert_eq!(top_for(1_000, 250, 50), 0);
    }
}
