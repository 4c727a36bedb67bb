//! Rover control loop
//!
//! Owns the rover and runs it on a fixed 10 ms tick. Each tick drains
//! whatever bytes the UART task has collected, so commands, safety,
//! motion and telemetry all advance from the same place in a fixed order.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};
use picket_core::traits::LineSink;
use picket_protocol::OutLine;

use crate::channels::{RX_BYTES, RX_PIPE_SIZE, TX_LINES};
use crate::hardware::BoardRover;

/// Control loop period
const TICK_INTERVAL_MS: u64 = 10;

/// Milliseconds since boot, wrapping
pub fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Queues reply lines for the UART TX task without waiting
struct ChannelSink;

impl LineSink for ChannelSink {
    fn send_line(&mut self, line: &str) {
        let Ok(out) = OutLine::try_from(line) else {
            warn!("Reply too long, dropped");
            return;
        };
        if TX_LINES.try_send(out).is_err() {
            warn!("TX queue full, dropped reply");
        }
    }
}

#[embassy_executor::task]
pub async fn control_task(mut rover: BoardRover) {
    info!("Control task started");

    let mut sink = ChannelSink;
    rover.boot(now_ms(), &mut sink);

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut input = [0u8; RX_PIPE_SIZE];

    loop {
        ticker.next().await;

        // The pipe is a ring, so a full drain can take two reads
        let mut len = 0;
        while len < input.len() {
            match RX_BYTES.try_read(&mut input[len..]) {
                Ok(n) if n > 0 => len += n,
                _ => break,
            }
        }

        rover.tick(now_ms(), &input[..len], &mut sink);
    }
}
