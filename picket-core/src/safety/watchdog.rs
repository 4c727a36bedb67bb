//! Host link watchdog
//!
//! Stops the rover when the host goes quiet and keeps it stopped until
//! the host speaks again.

/// Watchdog state after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogStatus {
    /// Heartbeat is fresh
    Ok,
    /// Timeout just expired; stop and report once
    Tripped,
    /// Still timed out; keep the rover stopped
    Latched,
}

/// Heartbeat clock with a latching timeout
#[derive(Debug, Clone)]
pub struct Watchdog {
    timeout_ms: u32,
    last_seen_ms: u32,
    latched: bool,
}

impl Watchdog {
    /// Create a watchdog counting from `now_ms`
    pub fn new(timeout_ms: u32, now_ms: u32) -> Self {
        Self {
            timeout_ms,
            last_seen_ms: now_ms,
            latched: false,
        }
    }

    /// Record host traffic; clears the latch
    pub fn note_heartbeat(&mut self, now_ms: u32) {
        if self.latched {
            info!("Watchdog released");
        }
        self.last_seen_ms = now_ms;
        self.latched = false;
    }

    /// Check the timeout
    pub fn tick(&mut self, now_ms: u32) -> WatchdogStatus {
        if self.latched {
            return WatchdogStatus::Latched;
        }

        if now_ms.wrapping_sub(self.last_seen_ms) > self.timeout_ms {
            warn!("Watchdog tripped after {} ms without heartbeat", self.timeout_ms);
            self.latched = true;
            return WatchdogStatus::Tripped;
        }

        WatchdogStatus::Ok
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}
