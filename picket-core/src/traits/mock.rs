//! Mock hardware for host tests

use heapless::Vec;
use picket_protocol::OutLine;

use super::{DirectionRegister, EchoSensor, EnableGate, LineSink, ServoOutput};

/// Records the latched register byte and how often it was latched
#[derive(Debug, Default)]
pub struct MockRegister {
    staged: u8,
    pub latched: u8,
    pub applies: u32,
    /// Individual bit writes (set or clear)
    pub bit_writes: u32,
}

impl DirectionRegister for MockRegister {
    fn set_bit(&mut self, bit: u8) {
        self.staged |= 1 << bit;
        self.bit_writes += 1;
    }

    fn clear_bit(&mut self, bit: u8) {
        self.staged &= !(1 << bit);
        self.bit_writes += 1;
    }

    fn apply(&mut self) {
        self.latched = self.staged;
        self.applies += 1;
    }
}

#[derive(Debug, Default)]
pub struct MockGate {
    pub duty: u8,
    pub writes: u32,
}

impl EnableGate for MockGate {
    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
        self.writes += 1;
    }
}

#[derive(Debug, Default)]
pub struct MockServo {
    pub attached: bool,
    pub angle: u8,
    pub writes: u32,
    pub detaches: u32,
}

impl ServoOutput for MockServo {
    fn attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
        self.detaches += 1;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn write_angle(&mut self, deg: u8) {
        self.angle = deg;
        self.writes += 1;
    }
}

/// Echo sensor returning a fixed pulse width
#[derive(Debug, Default)]
pub struct MockEcho {
    pub echo_us: Option<u32>,
    pub pings: u32,
}

impl MockEcho {
    /// Echo for an obstacle at `cm` using 58 us/cm
    pub fn at_cm(cm: u32) -> Self {
        Self {
            echo_us: Some(cm * 58),
            pings: 0,
        }
    }

    pub fn set_cm(&mut self, cm: Option<u32>) {
        self.echo_us = cm.map(|c| c * 58);
    }
}

impl EchoSensor for MockEcho {
    fn ping(&mut self, timeout_us: u32) -> Option<u32> {
        self.pings += 1;
        self.echo_us.filter(|&us| us <= timeout_us)
    }
}

/// Collects outbound lines
#[derive(Debug, Default)]
pub struct MockSink {
    pub lines: Vec<OutLine, 64>,
}

impl MockSink {
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.lines.iter().filter(|l| l.starts_with(prefix)).count()
    }

    pub fn has(&self, line: &str) -> bool {
        self.lines.iter().any(|l| l.as_str() == line)
    }
}

impl LineSink for MockSink {
    fn send_line(&mut self, line: &str) {
        let mut out = OutLine::new();
        let _ = out.push_str(line);
        // Tests clear between phases; overflowing means a runaway emitter
        assert!(self.lines.push(out).is_ok(), "mock sink overflow");
    }
}
