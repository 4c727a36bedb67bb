//! Owned control context

use picket_protocol::StopReason;

use super::mode::MotionMode;

/// One range reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DistanceSample {
    /// Distance in tenths of a centimetre; `None` when invalid
    pub cm_x10: Option<u16>,
    /// When the reading was taken
    pub at_ms: u32,
}

/// Mutable control state shared by all components
#[derive(Debug, Clone)]
pub struct RoverState {
    mode: MotionMode,
    /// When the current mode was entered (pulse phase origin)
    mode_since_ms: u32,
    /// Explicit drive duty; `None` uses the mode's tier duty
    pub duty_override: Option<u8>,
    /// Safety stop distance, 0 = disabled
    pub threshold_cm: u16,
    /// Periodic telemetry enabled
    pub verbose: bool,
    /// Continuous sweep allowed while moving
    pub sweep_enabled: bool,
    /// Most recent stop and its cause
    pub last_stop: Option<StopReason>,
}

impl RoverState {
    /// Safe boot state: stopped, no override, threshold disabled
    pub fn new(verbose: bool, sweep_enabled: bool) -> Self {
        Self {
            mode: MotionMode::Stop,
            mode_since_ms: 0,
            duty_override: None,
            threshold_cm: 0,
            verbose,
            sweep_enabled,
            last_stop: None,
        }
    }

    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    pub fn mode_since_ms(&self) -> u32 {
        self.mode_since_ms
    }

    /// Enter a drive mode
    ///
    /// Re-entering the current mode keeps its start time so repeated
    /// commands do not restart the pulse phase.
    pub fn set_mode(&mut self, mode: MotionMode, duty_override: Option<u8>, now_ms: u32) {
        if mode != self.mode {
            self.mode = mode;
            self.mode_since_ms = now_ms;
        }
        self.duty_override = duty_override;
    }

    /// Whether the head should be sweeping right now
    ///
    /// Sweep only runs while it is enabled and the rover is moving.
    pub fn sweep_engaged(&self) -> bool {
        self.sweep_enabled && self.mode.is_moving()
    }

    /// Stop and record why
    pub fn stop(&mut self, reason: StopReason, now_ms: u32) {
        self.set_mode(MotionMode::Stop, None, now_ms);
        self.last_stop = Some(reason);
    }
}
