//! Range sensor monitor
//!
//! Measurements are rate-limited, gated on the sensor head being
//! settled and clamped to a plausible window. Anything outside the
//! window, and any missing echo, is reported as invalid rather than as a
//! number.
//!
//! A background sampler runs at a fixed cadence and trips the safety
//! stop after a configured number of consecutive readings at or inside
//! the threshold.

use crate::config::RangeConfig;
use crate::state::DistanceSample;
use crate::traits::EchoSensor;

/// Outcome of one safety sampler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyVerdict {
    /// Nothing to do
    Clear,
    /// Debounced obstacle while moving; stop now
    Trip,
}

/// Range sensor with cooldown, plausibility window and debounce
pub struct RangeMonitor<E> {
    sensor: E,
    config: RangeConfig,
    /// Most recent measurement, valid or not
    last: Option<DistanceSample>,
    /// When the safety sampler last ran
    last_safety_ms: Option<u32>,
    /// Consecutive hits
    hits: u8,
}

impl<E: EchoSensor> RangeMonitor<E> {
    pub fn new(sensor: E, config: RangeConfig) -> Self {
        Self {
            sensor,
            config,
            last: None,
            last_safety_ms: None,
            hits: 0,
        }
    }

    /// Take a reading in tenths of a centimetre
    ///
    /// Within the cooldown after the previous measurement the cached
    /// value is returned without pinging. While the head is unsettled
    /// the result is invalid and nothing is cached.
    pub fn measure(&mut self, now_ms: u32, settled: bool) -> Option<u16> {
        if let Some(last) = self.last {
            if now_ms.wrapping_sub(last.at_ms) < self.config.cooldown_ms {
                return last.cm_x10;
            }
        }

        if !settled {
            return None;
        }

        let cm_x10 = self
            .sensor
            .ping(self.config.echo_timeout_us)
            .and_then(|us| self.to_cm_x10(us));

        self.last = Some(DistanceSample {
            cm_x10,
            at_ms: now_ms,
        });
        cm_x10
    }

    /// Convert an echo width to tenths of a centimetre inside the window
    fn to_cm_x10(&self, echo_us: u32) -> Option<u16> {
        let x10 = echo_us.saturating_mul(10) / self.config.us_per_cm as u32;
        let min = self.config.min_cm as u32 * 10;
        let max = self.config.max_cm as u32 * 10;
        if (min..=max).contains(&x10) {
            Some(x10 as u16)
        } else {
            None
        }
    }

    /// Most recent measurement
    pub fn last_sample(&self) -> Option<DistanceSample> {
        self.last
    }

    /// Most recent reading, `None` if it was invalid or never taken
    pub fn last_cm_x10(&self) -> Option<u16> {
        self.last.and_then(|s| s.cm_x10)
    }

    /// Consecutive hits so far
    pub fn hits(&self) -> u8 {
        self.hits
    }

    pub fn reset_debounce(&mut self) {
        self.hits = 0;
    }

    /// Run the background safety sampler
    ///
    /// Samples at most once per safety period. A threshold of 0 disables
    /// the sampler and holds the counter at zero. While the head is
    /// unsettled a due sample is deferred, not counted as a miss, so a
    /// sweeping head still gets one sample per step. When the counter
    /// fills it resets; the result is a trip only if the rover is moving.
    pub fn safety_tick(
        &mut self,
        now_ms: u32,
        settled: bool,
        threshold_cm: u16,
        moving: bool,
    ) -> SafetyVerdict {
        if let Some(last) = self.last_safety_ms {
            if now_ms.wrapping_sub(last) < self.config.safety_period_ms {
                return SafetyVerdict::Clear;
            }
        }

        if threshold_cm == 0 {
            self.last_safety_ms = Some(now_ms);
            self.hits = 0;
            return SafetyVerdict::Clear;
        }

        if !settled {
            return SafetyVerdict::Clear;
        }
        self.last_safety_ms = Some(now_ms);

        let limit = threshold_cm as u32 * 10;
        let hit = self
            .measure(now_ms, settled)
            .is_some_and(|x10| x10 as u32 <= limit);

        if !hit {
            self.hits = 0;
            return SafetyVerdict::Clear;
        }

        self.hits = self.hits.saturating_add(1);
        if self.hits < self.config.debounce_hits {
            return SafetyVerdict::Clear;
        }

        self.hits = 0;
        if moving {
            warn!("Safety stop: obstacle inside {} cm", threshold_cm);
            SafetyVerdict::Trip
        } else {
            SafetyVerdict::Clear
        }
    }

    pub fn sensor(&self) -> &E {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut E {
        &mut self.sensor
    }
}
