//! Status telemetry
//!
//! `STAT` lines go out on request, after significant events and, while
//! verbose, on a fixed period. The periodic path only decides *when*;
//! the snapshot itself is a pure function of the current state.

use picket_protocol::StatusLine;

use crate::config::TelemetryConfig;
use crate::state::RoverState;

/// Periodic status cadence
#[derive(Debug, Clone)]
pub struct TelemetryReporter {
    period_ms: u32,
    last_emit_ms: Option<u32>,
}

impl TelemetryReporter {
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            period_ms: config.period_ms,
            last_emit_ms: None,
        }
    }

    /// Whether a periodic `STAT` is due now
    ///
    /// Returns true at most once per period and never while quiet.
    pub fn periodic_due(&mut self, now_ms: u32, verbose: bool) -> bool {
        if !verbose {
            return false;
        }
        if let Some(last) = self.last_emit_ms {
            if now_ms.wrapping_sub(last) < self.period_ms {
                return false;
            }
        }
        self.last_emit_ms = Some(now_ms);
        true
    }
}

/// Build a `STAT` snapshot
pub fn snapshot(state: &RoverState, duty: u8, last_cm_x10: Option<u16>) -> StatusLine {
    StatusLine {
        mode: state.mode().code(),
        duty,
        threshold_cm: state.threshold_cm,
        last_cm_x10,
        sweep: state.sweep_engaged(),
    }
}
