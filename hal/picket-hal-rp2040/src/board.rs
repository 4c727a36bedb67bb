//! Rover pin map
//!
//! The motor shield's Arduino header is wired to the RP2040 as follows:
//!
//! | Function            | Shield pin | GPIO |
//! |---------------------|------------|------|
//! | 74HC595 SER         | D8         | 8    |
//! | 74HC595 SRCLK       | D4         | 4    |
//! | 74HC595 RCLK        | D12        | 12   |
//! | 74HC595 /OE (gate)  | D7         | 7    |
//! | Servo               | D10        | 10   |
//! | HC-SR04 trigger     | A0         | 26   |
//! | HC-SR04 echo        | A1         | 27   |
//! | Host UART TX / RX   | D1 / D0    | 0 / 1|
//!
//! Every GPIO belongs to one of eight PWM slices. Two PWM outputs on the
//! same slice share its counter, so they cannot run different frame
//! rates; the gate then falls back to on/off switching.

use picket_core::config::PlatformCapabilities;

/// Host link baud rate
pub const UART_BAUD: u32 = 115_200;

/// GPIO numbers for each board function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMap {
    pub shift_data: u8,
    pub shift_clock: u8,
    pub shift_latch: u8,
    pub gate: u8,
    pub servo: u8,
    pub trigger: u8,
    pub echo: u8,
    pub uart_tx: u8,
    pub uart_rx: u8,
}

/// The rover's wiring
pub const PINS: PinMap = PinMap {
    shift_data: 8,
    shift_clock: 4,
    shift_latch: 12,
    gate: 7,
    servo: 10,
    trigger: 26,
    echo: 27,
    uart_tx: 0,
    uart_rx: 1,
};

/// PWM slice driving a GPIO
pub const fn pwm_slice(gpio: u8) -> u8 {
    (gpio >> 1) & 7
}

impl PinMap {
    /// Capabilities implied by this wiring
    pub const fn capabilities(&self) -> PlatformCapabilities {
        PlatformCapabilities {
            shared_gate_timer: pwm_slice(self.gate) == pwm_slice(self.servo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pwm_slices() {
        assert_eq!(pwm_slice(0), 0);
        assert_eq!(pwm_slice(7), 3);
        assert_eq!(pwm_slice(10), 5);
        assert_eq!(pwm_slice(16), 0);
        assert_eq!(pwm_slice(27), 5);
    }

    #[test]
    fn test_rover_wiring_has_separate_timers() {
        assert!(!PINS.capabilities().shared_gate_timer);
    }

    #[test]
    fn test_shared_slice_detected() {
        let map = PinMap { servo: 6, ..PINS };
        assert!(map.capabilities().shared_gate_timer);
    }
}
