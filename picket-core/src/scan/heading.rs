//! Heading actuator with explicit and sweep behaviour
//!
//! - Explicit: hold the commanded angle and release the servo once it
//!   has settled, so it does not buzz while idle.
//! - Sweep: while enabled and the rover is moving, step between the
//!   sweep bounds at a fixed interval, keeping the servo engaged.
//!
//! Leaving sweep keeps the current angle as the explicit target.

use crate::config::ScanConfig;
use crate::traits::ServoOutput;

/// Largest servo angle
const MAX_DEG: u8 = 180;

pub struct HeadingActuator<S> {
    servo: S,
    config: ScanConfig,
    target: u8,
    /// Last angle written to the servo
    current: Option<u8>,
    changed_at_ms: u32,
    sweeping: bool,
    ascending: bool,
    last_step_ms: u32,
}

impl<S: ServoOutput> HeadingActuator<S> {
    pub fn new(servo: S, config: ScanConfig) -> Self {
        Self {
            servo,
            target: config.neutral_deg,
            config,
            current: None,
            changed_at_ms: 0,
            sweeping: false,
            ascending: true,
            last_step_ms: 0,
        }
    }

    /// Move to the neutral heading
    pub fn init(&mut self, now_ms: u32) {
        self.move_to(self.config.neutral_deg, now_ms);
    }

    /// Command an explicit heading
    ///
    /// Cancels any sweep. Repeating the current target does nothing, so
    /// the settle timer keeps running.
    pub fn set_target(&mut self, deg: u8, now_ms: u32) {
        let deg = deg.min(MAX_DEG);
        self.sweeping = false;

        if self.current == Some(deg) && self.target == deg {
            return;
        }
        self.move_to(deg, now_ms);
    }

    fn move_to(&mut self, deg: u8, now_ms: u32) {
        if !self.servo.is_attached() {
            self.servo.attach();
        }
        self.servo.write_angle(deg);
        self.current = Some(deg);
        self.target = deg;
        self.changed_at_ms = now_ms;
    }

    /// Whether the head has reached its target and had time to settle
    pub fn is_settled(&self, now_ms: u32) -> bool {
        self.current == Some(self.target)
            && now_ms.wrapping_sub(self.changed_at_ms) >= self.config.settle_ms
    }

    /// Advance sweep or release after settle
    ///
    /// `sweep` is true while sweeping is enabled and the rover moves.
    pub fn tick(&mut self, now_ms: u32, sweep: bool) {
        if sweep {
            self.sweep_tick(now_ms);
            return;
        }

        if self.sweeping {
            debug!("Sweep paused at {} deg", self.target);
            self.sweeping = false;
        }

        if self.servo.is_attached() && self.is_settled(now_ms) {
            self.servo.detach();
        }
    }

    fn sweep_tick(&mut self, now_ms: u32) {
        let lo = self.config.sweep_min_deg;
        let hi = self.config.sweep_max_deg.max(lo);

        if !self.sweeping {
            self.sweeping = true;
            self.last_step_ms = now_ms;

            let here = self.current.unwrap_or(self.config.neutral_deg);
            let start = here.clamp(lo, hi);
            if self.current != Some(start) {
                self.move_to(start, now_ms);
            } else if !self.servo.is_attached() {
                // Same position; re-engage without restarting the settle timer
                self.servo.attach();
                self.servo.write_angle(start);
            }
            return;
        }

        if now_ms.wrapping_sub(self.last_step_ms) < self.config.sweep_interval_ms {
            return;
        }
        self.last_step_ms = now_ms;

        let here = self.current.unwrap_or(self.config.neutral_deg);
        if self.ascending && here >= hi {
            self.ascending = false;
        } else if !self.ascending && here <= lo {
            self.ascending = true;
        }

        let step = self.config.sweep_step_deg;
        let next = if self.ascending {
            here.saturating_add(step).min(hi)
        } else {
            here.saturating_sub(step).max(lo)
        };
        self.move_to(next, now_ms);
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeping
    }

    pub fn servo(&self) -> &S {
        &self.servo
    }
}
