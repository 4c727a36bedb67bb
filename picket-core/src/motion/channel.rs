//! Motor channel table
//!
//! Each channel owns two bits (A, B) of the shared direction register:
//!
//! ```text
//!  A B
//!  0 0  idle (coast)
//!  1 0  forward
//!  0 1  reverse
//!  1 1  brake
//! ```
//!
//! Channels mounted mirror-image carry a polarity flag that swaps
//! forward and reverse.

use crate::state::{Side, SideDirection};

/// Number of motor channels on the chassis
pub const CHANNEL_COUNT: usize = 4;

/// Drive state of a single channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelDrive {
    Idle,
    Forward,
    Reverse,
    Brake,
}

impl From<SideDirection> for ChannelDrive {
    fn from(dir: SideDirection) -> Self {
        match dir {
            SideDirection::Idle => ChannelDrive::Idle,
            SideDirection::Forward => ChannelDrive::Forward,
            SideDirection::Reverse => ChannelDrive::Reverse,
        }
    }
}

impl ChannelDrive {
    /// (A, B) bit levels
    pub fn bits(&self) -> (bool, bool) {
        match self {
            ChannelDrive::Idle => (false, false),
            ChannelDrive::Forward => (true, false),
            ChannelDrive::Reverse => (false, true),
            ChannelDrive::Brake => (true, true),
        }
    }
}

/// One motor channel's wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorChannel {
    pub side: Side,
    /// Register bit for the A input
    pub bit_a: u8,
    /// Register bit for the B input
    pub bit_b: u8,
    /// Motor is mounted reversed
    pub reversed: bool,
}

impl MotorChannel {
    pub const fn new(side: Side, bit_a: u8, bit_b: u8, reversed: bool) -> Self {
        Self {
            side,
            bit_a,
            bit_b,
            reversed,
        }
    }

    /// Apply this channel's polarity to a requested drive
    ///
    /// Idle and brake are symmetric and pass through unchanged.
    pub fn orient(&self, drive: ChannelDrive) -> ChannelDrive {
        match (self.reversed, drive) {
            (true, ChannelDrive::Forward) => ChannelDrive::Reverse,
            (true, ChannelDrive::Reverse) => ChannelDrive::Forward,
            (_, d) => d,
        }
    }

    /// Write this channel's bits for `drive` into a register image
    pub fn encode(&self, image: u8, drive: ChannelDrive) -> u8 {
        let (a, b) = self.orient(drive).bits();
        let image = with_bit(image, self.bit_a, a);
        with_bit(image, self.bit_b, b)
    }
}

fn with_bit(image: u8, bit: u8, high: bool) -> u8 {
    if high {
        image | (1 << bit)
    } else {
        image & !(1 << bit)
    }
}

/// Wiring for all four channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMap {
    pub channels: [MotorChannel; CHANNEL_COUNT],
}

impl Default for ChannelMap {
    /// Motor-shield wiring: front-left, rear-left, rear-right, front-right
    fn default() -> Self {
        Self {
            channels: [
                MotorChannel::new(Side::Left, 2, 3, false),
                MotorChannel::new(Side::Left, 1, 4, true),
                MotorChannel::new(Side::Right, 5, 7, false),
                MotorChannel::new(Side::Right, 0, 6, true),
            ],
        }
    }
}

impl ChannelMap {
    /// Register image with each side driven as requested
    pub fn image(&self, left: ChannelDrive, right: ChannelDrive) -> u8 {
        self.channels.iter().fold(0u8, |image, ch| {
            let drive = match ch.side {
                Side::Left => left,
                Side::Right => right,
            };
            ch.encode(image, drive)
        })
    }

    /// Every bit used by some channel, each used once
    pub fn is_valid(&self) -> bool {
        let mut used = 0u8;
        for ch in &self.channels {
            for bit in [ch.bit_a, ch.bit_b] {
                if bit > 7 || used & (1 << bit) != 0 {
                    return false;
                }
                used |= 1 << bit;
            }
        }
        true
    }
}
