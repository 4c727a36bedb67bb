//! Configuration type definitions
//!
//! Defaults are the tuned values the rover ships with; the embedded
//! `rover.toml` only needs to name what it changes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Drive tier duties and slow-tier emulation timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriveConfig {
    /// Gate duty for the FAST tier
    pub fast_duty: u8,
    /// Gate duty for the SLOW tier
    pub slow_duty: u8,
    /// Duty used when a drive command names none
    pub default_duty: u8,
    /// Time-slice period for emulated SLOW sides
    pub pulse_period_ms: u16,
    /// ON portion of each emulation period
    pub pulse_on_ms: u16,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            fast_duty: 230,
            slow_duty: 150,
            default_duty: 160,
            pulse_period_ms: 55,
            pulse_on_ms: 40,
        }
    }
}

/// Range sensor timing, conversion and safety sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeConfig {
    /// Smallest plausible reading
    pub min_cm: u16,
    /// Largest plausible reading
    pub max_cm: u16,
    /// Minimum gap between two measurements
    pub cooldown_ms: u32,
    /// Echo wait bound
    pub echo_timeout_us: u32,
    /// Round-trip echo time per centimetre
    pub us_per_cm: u16,
    /// Background safety sampling cadence
    pub safety_period_ms: u32,
    /// Consecutive hits needed to force a stop
    pub debounce_hits: u8,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            min_cm: 3,
            max_cm: 300,
            cooldown_ms: 40,
            echo_timeout_us: 30_000,
            us_per_cm: 58,
            safety_period_ms: 80,
            debounce_hits: 3,
        }
    }
}

/// Heading behaviour selected at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScanMode {
    /// Hold the commanded heading, release the servo after settling
    #[default]
    Explicit,
    /// Bounce between the sweep bounds while moving
    Sweep,
}

/// Heading actuator timing and sweep geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanConfig {
    pub mode: ScanMode,
    /// Time after a position write before readings are trusted
    pub settle_ms: u32,
    /// Heading used at boot and for a bare `P`
    pub neutral_deg: u8,
    pub sweep_min_deg: u8,
    pub sweep_max_deg: u8,
    pub sweep_step_deg: u8,
    /// Time between sweep steps; must exceed `settle_ms`
    pub sweep_interval_ms: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::Explicit,
            settle_ms: 100,
            neutral_deg: 90,
            sweep_min_deg: 45,
            sweep_max_deg: 135,
            sweep_step_deg: 15,
            sweep_interval_ms: 120,
        }
    }
}

/// Watchdog timeout profile
///
/// Selected at build time by the `bench` cargo feature. There is no
/// command to switch profiles on a running rover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WatchdogProfile {
    /// Host-supervised driving
    Live,
    /// Interactive bench use from a terminal
    Bench,
}

impl WatchdogProfile {
    /// Profile this build was compiled for
    pub const fn active() -> Self {
        if cfg!(feature = "bench") {
            WatchdogProfile::Bench
        } else {
            WatchdogProfile::Live
        }
    }

    pub fn is_bench(&self) -> bool {
        matches!(self, WatchdogProfile::Bench)
    }
}

/// Watchdog timeouts per profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchdogConfig {
    pub live_timeout_ms: u32,
    pub bench_timeout_ms: u32,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            live_timeout_ms: 600,
            bench_timeout_ms: 60_000,
        }
    }
}

impl WatchdogConfig {
    /// Timeout for the given profile
    pub fn timeout_ms(&self, profile: WatchdogProfile) -> u32 {
        match profile {
            WatchdogProfile::Live => self.live_timeout_ms,
            WatchdogProfile::Bench => self.bench_timeout_ms,
        }
    }
}

/// Periodic status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TelemetryConfig {
    pub period_ms: u32,
    /// Boot verbosity; `None` follows the profile (on live, off bench)
    pub verbose: Option<bool>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            period_ms: 250,
            verbose: None,
        }
    }
}

impl TelemetryConfig {
    /// Verbosity at boot for the given profile
    pub fn verbose_at_boot(&self, profile: WatchdogProfile) -> bool {
        self.verbose.unwrap_or(!profile.is_bench())
    }
}

/// Board-level overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlatformConfig {
    /// Use on/off gating even when the board could run gate PWM
    pub force_binary_gate: bool,
}

/// Hardware facts discovered at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlatformCapabilities {
    /// Gate PWM and servo PWM share one hardware timer
    pub shared_gate_timer: bool,
}

impl PlatformCapabilities {
    /// Whether the enable gate must be driven fully on/off
    pub fn binary_gate(&self, platform: &PlatformConfig) -> bool {
        self.shared_gate_timer || platform.force_binary_gate
    }
}

/// Complete rover configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoverConfig {
    pub drive: DriveConfig,
    pub range: RangeConfig,
    pub scan: ScanConfig,
    pub watchdog: WatchdogConfig,
    pub telemetry: TelemetryConfig,
    pub platform: PlatformConfig,
}

impl RoverConfig {
    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.drive;
        if d.slow_duty >= d.fast_duty {
            return Err(ConfigError::Inconsistent("drive.slow_duty must be below fast_duty"));
        }
        if d.pulse_on_ms == 0 || d.pulse_on_ms >= d.pulse_period_ms {
            return Err(ConfigError::Inconsistent(
                "drive.pulse_on_ms must be within pulse_period_ms",
            ));
        }

        let r = &self.range;
        if r.min_cm >= r.max_cm {
            return Err(ConfigError::Inconsistent("range.min_cm must be below max_cm"));
        }
        if r.us_per_cm == 0 || r.safety_period_ms == 0 || r.debounce_hits == 0 {
            return Err(ConfigError::Inconsistent(
                "range.us_per_cm, safety_period_ms and debounce_hits must be non-zero",
            ));
        }

        let s = &self.scan;
        if s.neutral_deg > 180 || s.sweep_max_deg > 180 || s.sweep_min_deg > s.sweep_max_deg {
            return Err(ConfigError::Inconsistent("scan angles must satisfy min <= max <= 180"));
        }
        if s.sweep_step_deg == 0 {
            return Err(ConfigError::Inconsistent("scan.sweep_step_deg must be non-zero"));
        }
        if s.sweep_interval_ms <= s.settle_ms {
            return Err(ConfigError::Inconsistent(
                "scan.sweep_interval_ms must exceed settle_ms",
            ));
        }

        let w = &self.watchdog;
        if w.live_timeout_ms == 0 || w.bench_timeout_ms == 0 {
            return Err(ConfigError::Inconsistent("watchdog timeouts must be non-zero"));
        }

        if self.telemetry.period_ms == 0 {
            return Err(ConfigError::Inconsistent("telemetry.period_ms must be non-zero"));
        }

        Ok(())
    }
}
