//! Concrete driver types for the rover board

use embassy_rp::gpio::{Input, Output};
use embassy_time::Delay;
use picket_core::scheduler::Rover;
use picket_core::traits::EnableGate;
use picket_drivers::{Hcsr04, HobbyServo, PwmGate, ShiftRegister595, SwitchGate};
use picket_hal_rp2040::{SliceChannel, UptimeMicros};

pub type BoardRegister = ShiftRegister595<Output<'static>, Output<'static>, Output<'static>>;
pub type BoardServo = HobbyServo<SliceChannel>;
pub type BoardRanger = Hcsr04<Output<'static>, Input<'static>, Delay, UptimeMicros>;
pub type BoardRover = Rover<BoardRegister, BoardGate, BoardServo, BoardRanger>;

/// Motor enable gate, chosen at boot
///
/// PWM when the gate pin has a slice to itself, plain on/off otherwise.
pub enum BoardGate {
    Pwm(PwmGate<SliceChannel>),
    Switch(SwitchGate<Output<'static>>),
}

impl EnableGate for BoardGate {
    fn set_duty(&mut self, duty: u8) {
        match self {
            BoardGate::Pwm(gate) => gate.set_duty(duty),
            BoardGate::Switch(gate) => gate.set_duty(duty),
        }
    }
}
