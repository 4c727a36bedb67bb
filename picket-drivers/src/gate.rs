//! Shared enable line
//!
//! One line enables every motor channel at once. On the motor shield it
//! is the 74HC595 output-enable, which is active low: holding it low
//! drives the direction bits onto the bridges, holding it high floats
//! them and the motors coast.
//!
//! Two flavours exist because the gate may not always get a PWM timer of
//! its own (see `PlatformCapabilities`):
//!
//! - [`PwmGate`]: proportional duty on a PWM channel
//! - [`SwitchGate`]: plain GPIO, any non-zero duty is fully on

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use picket_core::traits::EnableGate;

use crate::error::DriverError;

/// Electrical level that enables the motors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    High,
    Low,
}

/// Gate driven from a PWM channel
pub struct PwmGate<P> {
    pwm: P,
    active: ActiveLevel,
    duty: u8,
}

impl<P: SetDutyCycle> PwmGate<P> {
    /// Wrap a PWM channel, starting with the motors disabled
    pub fn new(pwm: P, active: ActiveLevel) -> Self {
        let mut gate = Self { pwm, active, duty: 0 };
        let _ = gate.write(0);
        gate
    }

    /// Gate for the shield's active-low output enable
    pub fn active_low(pwm: P) -> Self {
        Self::new(pwm, ActiveLevel::Low)
    }

    /// Drive the gate at `duty` out of 255
    pub fn write(&mut self, duty: u8) -> Result<(), DriverError<P::Error>> {
        let on = match self.active {
            ActiveLevel::High => duty,
            ActiveLevel::Low => u8::MAX - duty,
        };
        self.pwm.set_duty_cycle_fraction(on as u16, u8::MAX as u16)?;
        self.duty = duty;
        Ok(())
    }

    pub fn duty(&self) -> u8 {
        self.duty
    }
}

impl<P: SetDutyCycle> EnableGate for PwmGate<P> {
    fn set_duty(&mut self, duty: u8) {
        let _ = self.write(duty);
    }
}

/// Gate driven from a plain GPIO
pub struct SwitchGate<P> {
    pin: P,
    active: ActiveLevel,
    on: bool,
}

impl<P: OutputPin> SwitchGate<P> {
    /// Wrap a GPIO, starting with the motors disabled
    pub fn new(pin: P, active: ActiveLevel) -> Self {
        let mut gate = Self {
            pin,
            active,
            on: false,
        };
        let _ = gate.switch(false);
        gate
    }

    pub fn active_low(pin: P) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    pub fn switch(&mut self, on: bool) -> Result<(), DriverError<P::Error>> {
        match (self.active, on) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => self.pin.set_high()?,
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => self.pin.set_low()?,
        }
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl<P: OutputPin> EnableGate for SwitchGate<P> {
    fn set_duty(&mut self, duty: u8) {
        let _ = self.switch(duty > 0);
    }
}
