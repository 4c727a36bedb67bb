//! Inter-task communication channels
//!
//! The UART tasks only move bytes and lines; everything the rover decides
//! happens in the control task on the other side of these queues.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::pipe::Pipe;
use picket_protocol::OutLine;

/// Bytes buffered between the UART reader and the control loop
///
/// At 115200 baud about 115 bytes arrive per 10 ms tick.
pub const RX_PIPE_SIZE: usize = 256;

/// Reply lines waiting for the UART writer
const TX_QUEUE_SIZE: usize = 16;

/// Raw bytes from the host
pub static RX_BYTES: Pipe<CriticalSectionRawMutex, RX_PIPE_SIZE> = Pipe::new();

/// Reply lines to the host, without line terminator
pub static TX_LINES: Channel<CriticalSectionRawMutex, OutLine, TX_QUEUE_SIZE> = Channel::new();
