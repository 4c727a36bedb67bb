//! Line assembly for the host link.
//!
//! Bytes arrive one at a time from the UART. A line ends at CR or LF, so
//! CR, LF and CRLF endings all yield exactly one line (the empty line
//! between CR and LF is dropped). The buffer is bounded: a line longer
//! than [`MAX_LINE_LEN`] is reported once as an overflow and the rest of
//! it is discarded up to the next terminator.

use heapless::String;

use crate::command::ParseError;

/// Maximum accepted line length in bytes (excluding the terminator)
pub const MAX_LINE_LEN: usize = 64;

/// A complete inbound line, terminators stripped
pub type Line = String<MAX_LINE_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    /// Accumulating bytes of the current line
    Collecting,
    /// Dropping the tail of an over-long line
    Discarding,
}

/// State machine assembling bytes into lines
#[derive(Debug, Clone)]
pub struct LineBuffer {
    state: LineState,
    buffer: Line,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Create an empty line buffer
    pub const fn new() -> Self {
        Self {
            state: LineState::Collecting,
            buffer: String::new(),
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.state = LineState::Collecting;
        self.buffer.clear();
    }

    /// Number of bytes buffered for the current line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a non-empty
    /// line, `Ok(None)` when more bytes are needed, and
    /// `Err(ParseError::Overflow)` exactly once per over-long line.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, ParseError> {
        let terminator = byte == b'\r' || byte == b'\n';

        match self.state {
            LineState::Discarding => {
                if terminator {
                    self.state = LineState::Collecting;
                }
                Ok(None)
            }
            LineState::Collecting if terminator => {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let line = self.buffer.clone();
                self.buffer.clear();
                Ok(Some(line))
            }
            LineState::Collecting => {
                // Other control bytes are line noise
                if byte.is_ascii_control() {
                    return Ok(None);
                }
                let ch = if byte.is_ascii() { byte as char } else { '?' };
                if self.buffer.push(ch).is_err() {
                    self.buffer.clear();
                    self.state = LineState::Discarding;
                    return Err(ParseError::Overflow);
                }
                Ok(None)
            }
        }
    }
}
