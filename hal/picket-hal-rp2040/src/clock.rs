//! Microsecond clock backed by the embassy time driver

use embassy_time::Instant;
use picket_drivers::MicrosClock;

/// Truncated microsecond uptime
#[derive(Debug, Clone, Copy, Default)]
pub struct UptimeMicros;

impl MicrosClock for UptimeMicros {
    fn now_us(&mut self) -> u32 {
        Instant::now().as_micros() as u32
    }
}
