//! Hobby servo on a 50 Hz PWM channel
//!
//! Position is encoded as a pulse width inside a 20 ms frame. Detaching
//! stops the pulses entirely, which makes the servo go limp instead of
//! hunting around its setpoint.

use embedded_hal::pwm::SetDutyCycle;
use picket_core::traits::ServoOutput;

use crate::error::DriverError;

/// Pulse timing for a servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoTiming {
    /// PWM frame length
    pub period_us: u16,
    /// Pulse width at 0 degrees
    pub min_pulse_us: u16,
    /// Pulse width at 180 degrees
    pub max_pulse_us: u16,
}

impl Default for ServoTiming {
    fn default() -> Self {
        Self {
            period_us: 20_000,
            min_pulse_us: 544,
            max_pulse_us: 2400,
        }
    }
}

impl ServoTiming {
    /// Pulse width for an angle, clamped to 180 degrees
    pub fn pulse_us(&self, deg: u8) -> u16 {
        let deg = deg.min(180) as u32;
        let span = self.max_pulse_us.saturating_sub(self.min_pulse_us) as u32;
        self.min_pulse_us + (span * deg / 180) as u16
    }
}

pub struct HobbyServo<P> {
    pwm: P,
    timing: ServoTiming,
    angle: u8,
    attached: bool,
}

impl<P: SetDutyCycle> HobbyServo<P> {
    /// Wrap a PWM channel already running at the frame rate
    ///
    /// The servo starts detached.
    pub fn new(pwm: P, timing: ServoTiming) -> Self {
        let mut servo = Self {
            pwm,
            timing,
            angle: 90,
            attached: false,
        };
        let _ = servo.pwm.set_duty_cycle_fully_off();
        servo
    }

    fn output(&mut self) -> Result<(), DriverError<P::Error>> {
        let pulse = self.timing.pulse_us(self.angle);
        self.pwm
            .set_duty_cycle_fraction(pulse, self.timing.period_us)?;
        Ok(())
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }
}

impl<P: SetDutyCycle> ServoOutput for HobbyServo<P> {
    fn attach(&mut self) {
        self.attached = true;
        let _ = self.output();
    }

    fn detach(&mut self) {
        self.attached = false;
        let _ = self.pwm.set_duty_cycle_fully_off();
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn write_angle(&mut self, deg: u8) {
        self.angle = deg.min(180);
        if self.attached {
            let _ = self.output();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;

    /// 1 us per count over a 20 ms frame
    #[derive(Default)]
    struct FakePwm {
        duty: u16,
    }

    impl ErrorType for FakePwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            20_000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_pulse_widths() {
        let t = ServoTiming::default();
        assert_eq!(t.pulse_us(0), 544);
        assert_eq!(t.pulse_us(90), 1472);
        assert_eq!(t.pulse_us(180), 2400);
        assert_eq!(t.pulse_us(255), 2400);
    }

    #[test]
    fn test_detached_is_silent() {
        let mut servo = HobbyServo::new(FakePwm::default(), ServoTiming::default());
        servo.write_angle(45);
        assert_eq!(servo.pwm.duty, 0);
        assert_eq!(servo.angle(), 45);
    }

    #[test]
    fn test_attach_outputs_last_angle() {
        let mut servo = HobbyServo::new(FakePwm::default(), ServoTiming::default());
        servo.write_angle(180);
        servo.attach();
        assert_eq!(servo.pwm.duty, 2400);

        servo.write_angle(0);
        assert_eq!(servo.pwm.duty, 544);
    }

    #[test]
    fn test_detach_stops_pulses() {
        let mut servo = HobbyServo::new(FakePwm::default(), ServoTiming::default());
        servo.attach();
        servo.detach();
        assert!(!servo.is_attached());
        assert_eq!(servo.pwm.duty, 0);
    }
}
