//! Output traits for the drive train and the sensor head

/// Latched direction bits for all motor channels
///
/// Bit changes are staged with [`set_bit`](Self::set_bit) and
/// [`clear_bit`](Self::clear_bit) and reach the outputs together on
/// [`apply`](Self::apply), so a channel never passes through a
/// half-written state.
pub trait DirectionRegister {
    /// Stage a bit high
    fn set_bit(&mut self, bit: u8);

    /// Stage a bit low
    fn clear_bit(&mut self, bit: u8);

    /// Latch all staged bits onto the outputs
    fn apply(&mut self);
}

/// The single enable line shared by every motor channel
pub trait EnableGate {
    /// Drive the gate at `duty` (0 = off, 255 = fully on)
    ///
    /// Implementations that can only switch on or off treat any
    /// non-zero duty as fully on.
    fn set_duty(&mut self, duty: u8);
}

/// Hobby servo carrying the range sensor
pub trait ServoOutput {
    /// Start emitting position pulses
    fn attach(&mut self);

    /// Stop emitting pulses; the servo goes limp
    fn detach(&mut self);

    fn is_attached(&self) -> bool;

    /// Command a position in degrees (0-180)
    fn write_angle(&mut self, deg: u8);
}
