//! Contract for host-side navigation policies.
//!
//! The rover does not plan. A host policy looks at the range readings,
//! picks exactly one drive intent per decision cycle and sends it as a
//! canonical command. The rover only promises to execute intents and to
//! stop on its own when the policy goes quiet or an obstacle appears.
//!
//! In return a policy must:
//!
//! - decide with hysteresis (separate enter/clear distances per tier)
//!   so readings hovering near a boundary do not flip the intent
//! - re-send its current command often enough to keep the rover's
//!   watchdog fed (see [`CommandCadence`])
//! - treat a missing reading (`DIST cm=NA`) as "unknown", never as
//!   "clear"
//!
//! Nothing in this module runs on the rover.

use crate::command::{Command, DriveKind, Duty};

/// A pair of distances forming a hysteresis band
///
/// The band becomes active at or below `enter_cm` and stays active until
/// the distance rises to `clear_cm` or beyond. `clear_cm` must be larger
/// than `enter_cm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HysteresisBand {
    pub enter_cm: u16,
    pub clear_cm: u16,
}

impl HysteresisBand {
    pub const fn new(enter_cm: u16, clear_cm: u16) -> Self {
        Self { enter_cm, clear_cm }
    }

    /// Whether the band's enter/clear pair actually forms a band
    pub fn is_valid(&self) -> bool {
        self.clear_cm > self.enter_cm
    }

    /// Next band state given the previous state and a reading
    ///
    /// An invalid reading leaves the state unchanged.
    pub fn update(&self, active: bool, distance_cm: Option<u16>) -> bool {
        match distance_cm {
            None => active,
            Some(d) if active => d < self.clear_cm,
            Some(d) => d <= self.enter_cm,
        }
    }
}

/// Hysteresis bands for each speed tier decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TierBands {
    /// Drop from FAST to SLOW
    pub slow: HysteresisBand,
    /// Start turning away
    pub turn: HysteresisBand,
    /// Stop and back off
    pub stop: HysteresisBand,
}

impl Default for TierBands {
    fn default() -> Self {
        Self {
            slow: HysteresisBand::new(60, 75),
            turn: HysteresisBand::new(35, 45),
            stop: HysteresisBand::new(20, 30),
        }
    }
}

impl TierBands {
    /// Bands must be valid and nested: stop inside turn inside slow
    pub fn is_valid(&self) -> bool {
        self.slow.is_valid()
            && self.turn.is_valid()
            && self.stop.is_valid()
            && self.stop.enter_cm < self.turn.enter_cm
            && self.turn.enter_cm < self.slow.enter_cm
    }
}

/// Timed phases a policy is expected to implement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PolicyTimings {
    /// Shortest committed turn before re-deciding
    pub min_turn_ms: u32,
    /// Reverse time after a stop
    pub backoff_ms: u32,
    /// Wait between re-scans while the sensor reads invalid
    pub rescan_ms: u32,
    /// No distance change while driving for this long counts as stuck
    pub stall_ms: u32,
}

impl Default for PolicyTimings {
    fn default() -> Self {
        Self {
            min_turn_ms: 550,
            backoff_ms: 500,
            rescan_ms: 200,
            stall_ms: 2500,
        }
    }
}

/// Range readings available to a policy, centimetres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Observation {
    pub center_cm: Option<u16>,
    pub left_cm: Option<u16>,
    pub right_cm: Option<u16>,
}

/// One decision: exactly one drive intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decision {
    Stop,
    Drive { kind: DriveKind, duty: Option<u8> },
}

impl Decision {
    /// Canonical command carrying this decision
    pub fn to_command(self) -> Command {
        match self {
            Decision::Stop => Command::Stop,
            Decision::Drive { kind, duty } => Command::Drive {
                kind,
                duty: duty.map_or(Duty::Default, Duty::Value),
            },
        }
    }
}

/// A host-side navigation policy
pub trait NavigationPolicy {
    /// Pick the intent for this cycle
    fn decide(&mut self, now_ms: u32, observation: &Observation) -> Decision;
}

/// Tracks when a policy must re-send its command
///
/// The rover stops after `timeout_ms` without traffic. The cadence
/// re-issues the current command at a third of that so a single lost
/// line never trips the watchdog.
#[derive(Debug, Clone)]
pub struct CommandCadence {
    period_ms: u32,
    last_sent: Option<(u32, Command)>,
}

impl CommandCadence {
    /// Build a cadence for a rover with the given watchdog timeout
    pub fn for_watchdog(timeout_ms: u32) -> Self {
        Self {
            period_ms: (timeout_ms / 3).max(1),
            last_sent: None,
        }
    }

    /// Re-send period in milliseconds
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Whether `command` should be sent now
    ///
    /// A changed command is always due. An unchanged one is due once the
    /// period has elapsed. Returning `true` records the send.
    pub fn due(&mut self, now_ms: u32, command: Command) -> bool {
        let due = match self.last_sent {
            None => true,
            Some((_, last)) if last != command => true,
            Some((at, _)) => now_ms.wrapping_sub(at) >= self.period_ms,
        };
        if due {
            self.last_sent = Some((now_ms, command));
        }
        due
    }
}
