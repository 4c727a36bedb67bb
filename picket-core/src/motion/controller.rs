//! Motion controller
//!
//! # Tier emulation
//!
//! There is one enable gate for all four channels, so both sides always
//! see the same gate duty. A side that needs SLOW while the gate runs at
//! FAST (the inner side of an arc) is slowed by time-slicing its
//! direction bits:
//!
//! ```text
//!        |<------- period (55 ms) ------->|
//!  bits  |====== on (40 ms) ======|_idle_|====== ...
//! ```
//!
//! When gate PWM would contend with the servo for a hardware timer the
//! gate can only be fully on or off. It then always runs at FAST and
//! every SLOW side is sliced.
//!
//! Writes are change-driven: bits are staged only where the register
//! image differs, the register is latched only when the image changed,
//! and the gate is written only when its duty changed.

use picket_protocol::Tier;

use super::channel::{ChannelDrive, ChannelMap};
use crate::config::DriveConfig;
use crate::state::{RoverState, SideIntent};
use crate::traits::{DirectionRegister, EnableGate};

/// Gate duty used for "fully on"
const GATE_FULL: u8 = u8::MAX;

/// Drives the direction register and enable gate from the motion mode
pub struct MotionController<R, G> {
    register: R,
    gate: G,
    channels: ChannelMap,
    drive: DriveConfig,
    binary_gate: bool,
    /// Last latched register image
    image: u8,
    /// Last gate duty written; `None` before the first write
    gate_duty: Option<u8>,
}

impl<R: DirectionRegister, G: EnableGate> MotionController<R, G> {
    /// Create a controller
    ///
    /// `binary_gate` selects on/off gating with sliced SLOW sides.
    pub fn new(register: R, gate: G, channels: ChannelMap, drive: DriveConfig, binary_gate: bool) -> Self {
        Self {
            register,
            gate,
            channels,
            drive,
            binary_gate,
            image: 0,
            gate_duty: None,
        }
    }

    /// Put every output in its safe state: gate off, all channels idle
    pub fn init(&mut self) {
        self.write_gate(0);
        for ch in &self.channels.channels {
            self.register.clear_bit(ch.bit_a);
            self.register.clear_bit(ch.bit_b);
        }
        self.register.apply();
        self.image = 0;
    }

    /// Duty the current mode asks for
    ///
    /// An explicit override wins over the mode's tier. STOP is always 0.
    pub fn effective_duty(&self, state: &RoverState) -> u8 {
        let mode = state.mode();
        if !mode.is_moving() {
            return 0;
        }
        state
            .duty_override
            .unwrap_or_else(|| self.tier_duty(mode.plan().outer))
    }

    /// Bring outputs in line with the current mode
    pub fn tick(&mut self, now_ms: u32, state: &RoverState) {
        let plan = state.mode().plan();
        let duty = self.effective_duty(state);

        let gate_duty = if self.binary_gate && duty > 0 {
            GATE_FULL
        } else {
            duty
        };

        // A zero period never slices
        let elapsed = now_ms.wrapping_sub(state.mode_since_ms());
        let phase_on = elapsed
            .checked_rem(u32::from(self.drive.pulse_period_ms))
            .map_or(true, |t| t < u32::from(self.drive.pulse_on_ms));

        let left = self.side_drive(plan.left, duty, phase_on);
        let right = self.side_drive(plan.right, duty, phase_on);
        let image = self.channels.image(left, right);

        // Cut the gate before touching the bits, raise it after
        if gate_duty == 0 {
            self.write_gate(0);
            self.write_register(image);
        } else {
            self.write_register(image);
            self.write_gate(gate_duty);
        }
    }

    fn tier_duty(&self, tier: Tier) -> u8 {
        match tier {
            Tier::Fast => self.drive.fast_duty,
            Tier::Slow => self.drive.slow_duty,
        }
    }

    /// Channel drive for one side, including slicing
    ///
    /// Only a SLOW side under a gate actually running at FAST is sliced.
    fn side_drive(&self, intent: SideIntent, duty: u8, phase_on: bool) -> ChannelDrive {
        let gate_fast = self.binary_gate || duty >= self.drive.fast_duty;
        let sliced = duty > 0 && intent.tier == Tier::Slow && gate_fast;

        if sliced && !phase_on {
            ChannelDrive::Idle
        } else {
            intent.direction.into()
        }
    }

    fn write_register(&mut self, image: u8) {
        let changed = image ^ self.image;
        if changed == 0 {
            return;
        }
        for bit in 0..8u8 {
            if changed & (1 << bit) == 0 {
                continue;
            }
            if image & (1 << bit) != 0 {
                self.register.set_bit(bit);
            } else {
                self.register.clear_bit(bit);
            }
        }
        self.register.apply();
        self.image = image;
    }

    fn write_gate(&mut self, duty: u8) {
        if self.gate_duty != Some(duty) {
            self.gate.set_duty(duty);
            self.gate_duty = Some(duty);
        }
    }

    /// Last latched register image
    pub fn image(&self) -> u8 {
        self.image
    }

    /// Last gate duty written
    pub fn gate_duty(&self) -> u8 {
        self.gate_duty.unwrap_or(0)
    }

    pub fn is_binary_gate(&self) -> bool {
        self.binary_gate
    }

    pub fn register(&self) -> &R {
        &self.register
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }
}
