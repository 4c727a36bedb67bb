//! Driver errors

/// Error raised by a driver
///
/// `E` is the underlying pin or PWM error of the HAL in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError<E> {
    /// A pin or PWM channel reported an error
    Pin(E),
    /// The device did not respond in time
    Timeout,
}

impl<E> From<E> for DriverError<E> {
    fn from(e: E) -> Self {
        DriverError::Pin(e)
    }
}
