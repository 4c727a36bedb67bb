//! HC-SR04 ultrasonic ranger
//!
//! A 10 us trigger pulse fires a burst; the echo pin then stays high for
//! the round-trip time. Both the wait for the rising edge and the pulse
//! itself count against one deadline, so a ping never blocks longer than
//! the timeout it was given.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use picket_core::traits::EchoSensor;

use crate::error::DriverError;

/// Trigger pulse width
const TRIGGER_US: u32 = 10;

/// Free-running microsecond counter
///
/// Only differences are used, so the counter may wrap.
pub trait MicrosClock {
    fn now_us(&mut self) -> u32;
}

pub struct Hcsr04<T, E, D, C> {
    trigger: T,
    echo: E,
    delay: D,
    clock: C,
}

impl<T, E, D, C> Hcsr04<T, E, D, C>
where
    T: OutputPin,
    E: InputPin<Error = T::Error>,
    D: DelayNs,
    C: MicrosClock,
{
    pub fn new(mut trigger: T, echo: E, delay: D, clock: C) -> Self {
        let _ = trigger.set_low();
        Self {
            trigger,
            echo,
            delay,
            clock,
        }
    }

    /// Fire one ping and return the echo pulse width in microseconds
    pub fn measure(&mut self, timeout_us: u32) -> Result<u32, DriverError<T::Error>> {
        self.trigger.set_low()?;
        self.delay.delay_us(2);
        self.trigger.set_high()?;
        self.delay.delay_us(TRIGGER_US);
        self.trigger.set_low()?;

        let start = self.clock.now_us();
        while !self.echo.is_high()? {
            if self.clock.now_us().wrapping_sub(start) > timeout_us {
                return Err(DriverError::Timeout);
            }
        }

        let rise = self.clock.now_us();
        while self.echo.is_high()? {
            if self.clock.now_us().wrapping_sub(start) > timeout_us {
                return Err(DriverError::Timeout);
            }
        }

        Ok(self.clock.now_us().wrapping_sub(rise))
    }
}

impl<T, E, D, C> EchoSensor for Hcsr04<T, E, D, C>
where
    T: OutputPin,
    E: InputPin<Error = T::Error>,
    D: DelayNs,
    C: MicrosClock,
{
    fn ping(&mut self, timeout_us: u32) -> Option<u32> {
        self.measure(timeout_us).ok()
    }
}
