//! 74HC595 shift register used as the motor direction register
//!
//! All eight outputs feed the H-bridge direction inputs. Bits are staged
//! in a shadow byte and shifted out MSB first on [`apply`], then latched
//! together so no channel ever sees a half-written byte.
//!
//! [`apply`]: picket_core::traits::DirectionRegister::apply

use embedded_hal::digital::{OutputPin, PinState};
use picket_core::traits::DirectionRegister;

use crate::error::DriverError;

/// Bit-banged 74HC595
pub struct ShiftRegister595<D, C, L> {
    data: D,
    clock: C,
    latch: L,
    /// Byte being assembled by `set_bit`/`clear_bit`
    staged: u8,
    /// Byte currently on the outputs
    latched: u8,
}

impl<D, C, L> ShiftRegister595<D, C, L>
where
    D: OutputPin,
    C: OutputPin<Error = D::Error>,
    L: OutputPin<Error = D::Error>,
{
    /// Wrap the data, clock and latch pins
    ///
    /// The register contents are unknown until the first write.
    pub fn new(data: D, clock: C, latch: L) -> Self {
        Self {
            data,
            clock,
            latch,
            staged: 0,
            latched: 0,
        }
    }

    /// Shift out and latch a full byte
    pub fn write(&mut self, value: u8) -> Result<(), DriverError<D::Error>> {
        self.latch.set_low()?;
        for bit in (0..8).rev() {
            let level = PinState::from(value & (1 << bit) != 0);
            self.data.set_state(level)?;
            self.clock.set_high()?;
            self.clock.set_low()?;
        }
        self.latch.set_high()?;
        self.latch.set_low()?;

        self.staged = value;
        self.latched = value;
        Ok(())
    }

    /// Byte currently on the outputs
    pub fn latched(&self) -> u8 {
        self.latched
    }

    pub fn release(self) -> (D, C, L) {
        (self.data, self.clock, self.latch)
    }
}

impl<D, C, L> DirectionRegister for ShiftRegister595<D, C, L>
where
    D: OutputPin,
    C: OutputPin<Error = D::Error>,
    L: OutputPin<Error = D::Error>,
{
    fn set_bit(&mut self, bit: u8) {
        self.staged |= 1 << (bit & 7);
    }

    fn clear_bit(&mut self, bit: u8) {
        self.staged &= !(1 << (bit & 7));
    }

    fn apply(&mut self) {
        // A failed write leaves `latched` stale; the next apply retries
        let staged = self.staged;
        let _ = self.write(staged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Behavioural model of the chip
    #[derive(Default)]
    struct Chip {
        data: bool,
        clock: bool,
        latch: bool,
        shift: u8,
        outputs: u8,
        clocks: u32,
    }

    #[derive(Clone, Copy)]
    enum Role {
        Data,
        Clock,
        Latch,
    }

    struct Pin<'a> {
        chip: &'a RefCell<Chip>,
        role: Role,
    }

    impl ErrorType for Pin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for Pin<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            let mut chip = self.chip.borrow_mut();
            match self.role {
                Role::Data => chip.data = false,
                Role::Clock => chip.clock = false,
                Role::Latch => chip.latch = false,
            }
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            let mut chip = self.chip.borrow_mut();
            match self.role {
                Role::Data => chip.data = true,
                Role::Clock => {
                    if !chip.clock {
                        chip.shift = (chip.shift << 1) | chip.data as u8;
                        chip.clocks += 1;
                    }
                    chip.clock = true;
                }
                Role::Latch => {
                    if !chip.latch {
                        chip.outputs = chip.shift;
                    }
                    chip.latch = true;
                }
            }
            Ok(())
        }
    }

    fn register(chip: &RefCell<Chip>) -> ShiftRegister595<Pin<'_>, Pin<'_>, Pin<'_>> {
        ShiftRegister595::new(
            Pin { chip, role: Role::Data },
            Pin { chip, role: Role::Clock },
            Pin { chip, role: Role::Latch },
        )
    }

    #[test]
    fn test_write_msb_first() {
        let chip = RefCell::new(Chip::default());
        let mut reg = register(&chip);
        reg.write(0b1010_0110).unwrap();

        let chip = chip.borrow();
        assert_eq!(chip.outputs, 0b1010_0110);
        assert_eq!(chip.clocks, 8);
        assert_eq!(reg.latched(), 0b1010_0110);
    }

    #[test]
    fn test_staged_bits_latch_together() {
        let chip = RefCell::new(Chip::default());
        let mut reg = register(&chip);

        reg.set_bit(2);
        reg.set_bit(5);
        assert_eq!(chip.borrow().outputs, 0);

        reg.apply();
        assert_eq!(chip.borrow().outputs, (1 << 2) | (1 << 5));

        reg.clear_bit(2);
        reg.apply();
        assert_eq!(chip.borrow().outputs, 1 << 5);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_outputs_match_written_byte(value: u8) {
                let chip = RefCell::new(Chip::default());
                let mut reg = register(&chip);
                reg.write(value).unwrap();
                prop_assert_eq!(chip.borrow().outputs, value);
            }
        }
    }
}
