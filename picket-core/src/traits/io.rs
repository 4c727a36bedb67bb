//! Input and link traits

/// Pulse-echo range sensor
pub trait EchoSensor {
    /// Fire one ping and wait for its echo
    ///
    /// Returns the echo pulse width in microseconds, or `None` if no echo
    /// arrived within `timeout_us`. Must never wait longer than the
    /// timeout.
    fn ping(&mut self, timeout_us: u32) -> Option<u32>;
}

/// Destination for outbound protocol lines
pub trait LineSink {
    /// Queue one line (without terminator) for the host
    ///
    /// Must not block. A sink that is full drops the line.
    fn send_line(&mut self, line: &str);
}
