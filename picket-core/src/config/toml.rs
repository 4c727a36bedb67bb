//! Minimal TOML parser for rover configuration
//!
//! This is NOT a general TOML parser. It handles the subset `rover.toml`
//! uses and needs neither an allocator nor the standard library.
//!
//! Supported features:
//! - `[section]` headers (one level)
//! - `key = value` pairs with integer, boolean and string values
//! - Comments (`# ...`), full-line and trailing
//!
//! Keys that appear before any section header, unknown sections and
//! unknown keys are all rejected so typos never pass silently.

use super::types::{RoverConfig, ScanMode};
use super::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Drive,
    Range,
    Scan,
    Watchdog,
    Telemetry,
    Platform,
}

/// Parse TOML text into a validated configuration
///
/// Missing keys keep their defaults.
pub fn parse_config(input: &str) -> Result<RoverConfig, ConfigError> {
    let mut config = RoverConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidValue)?;
        apply(&mut config, section, key, value)?;
    }

    config.validate()?;
    Ok(config)
}

fn apply(
    config: &mut RoverConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match section {
        Section::Root => return Err(ConfigError::UnknownKey),
        Section::Drive => {
            let d = &mut config.drive;
            match key {
                "fast_duty" => d.fast_duty = parse_int(value)?,
                "slow_duty" => d.slow_duty = parse_int(value)?,
                "default_duty" => d.default_duty = parse_int(value)?,
                "pulse_period_ms" => d.pulse_period_ms = parse_int(value)?,
                "pulse_on_ms" => d.pulse_on_ms = parse_int(value)?,
                _ => return Err(ConfigError::UnknownKey),
            }
        }
        Section::Range => {
            let r = &mut config.range;
            match key {
                "min_cm" => r.min_cm = parse_int(value)?,
                "max_cm" => r.max_cm = parse_int(value)?,
                "cooldown_ms" => r.cooldown_ms = parse_int(value)?,
                "echo_timeout_us" => r.echo_timeout_us = parse_int(value)?,
                "us_per_cm" => r.us_per_cm = parse_int(value)?,
                "safety_period_ms" => r.safety_period_ms = parse_int(value)?,
                "debounce_hits" => r.debounce_hits = parse_int(value)?,
                _ => return Err(ConfigError::UnknownKey),
            }
        }
        Section::Scan => {
            let s = &mut config.scan;
            match key {
                "mode" => s.mode = parse_scan_mode(value)?,
                "settle_ms" => s.settle_ms = parse_int(value)?,
                "neutral_deg" => s.neutral_deg = parse_int(value)?,
                "sweep_min_deg" => s.sweep_min_deg = parse_int(value)?,
                "sweep_max_deg" => s.sweep_max_deg = parse_int(value)?,
                "sweep_step_deg" => s.sweep_step_deg = parse_int(value)?,
                "sweep_interval_ms" => s.sweep_interval_ms = parse_int(value)?,
                _ => return Err(ConfigError::UnknownKey),
            }
        }
        Section::Watchdog => {
            let w = &mut config.watchdog;
            match key {
                "live_timeout_ms" => w.live_timeout_ms = parse_int(value)?,
                "bench_timeout_ms" => w.bench_timeout_ms = parse_int(value)?,
                _ => return Err(ConfigError::UnknownKey),
            }
        }
        Section::Telemetry => {
            let t = &mut config.telemetry;
            match key {
                "period_ms" => t.period_ms = parse_int(value)?,
                "verbose" => t.verbose = Some(parse_bool(value)?),
                _ => return Err(ConfigError::UnknownKey),
            }
        }
        Section::Platform => match key {
            "force_binary_gate" => config.platform.force_binary_gate = parse_bool(value)?,
            _ => return Err(ConfigError::UnknownKey),
        },
    }
    Ok(())
}

/// Parse a `[name]` header line
fn parse_section_header(line: &str) -> Result<Section, ConfigError> {
    let inner = line
        .strip_prefix('[')
        .and_then(|l| strip_comment(l).trim_end().strip_suffix(']'))
        .ok_or(ConfigError::InvalidSection)?;

    match inner.trim() {
        "drive" => Ok(Section::Drive),
        "range" => Ok(Section::Range),
        "scan" => Ok(Section::Scan),
        "watchdog" => Ok(Section::Watchdog),
        "telemetry" => Ok(Section::Telemetry),
        "platform" => Ok(Section::Platform),
        _ => Err(ConfigError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(&line[eq_pos + 1..]).trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Remove a trailing comment that is not inside a string
fn strip_comment(value: &str) -> &str {
    let mut in_string = false;
    for (i, ch) in value.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &value[..i],
            _ => {}
        }
    }
    value
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ConfigError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ConfigError::InvalidValue)
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ConfigError> {
    let mut acc: u64 = 0;
    let mut digits = 0;
    for b in value.bytes() {
        match b {
            b'_' => continue,
            b'0'..=b'9' => {
                acc = acc
                    .checked_mul(10)
                    .and_then(|a| a.checked_add((b - b'0') as u64))
                    .ok_or(ConfigError::InvalidValue)?;
                digits += 1;
            }
            _ => return Err(ConfigError::InvalidValue),
        }
    }
    if digits == 0 {
        return Err(ConfigError::InvalidValue);
    }
    T::try_from(acc).map_err(|_| ConfigError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

fn parse_scan_mode(value: &str) -> Result<ScanMode, ConfigError> {
    match parse_string(value)? {
        "explicit" => Ok(ScanMode::Explicit),
        "sweep" => Ok(ScanMode::Sweep),
        _ => Err(ConfigError::InvalidValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Rover tuning
[drive]
fast_duty = 220   # a little gentler
slow_duty = 140

[range]
echo_timeout_us = 25_000
debounce_hits = 4

[scan]
mode = "sweep"
sweep_interval_ms = 150

[watchdog]
live_timeout_ms = 800

[telemetry]
verbose = false

[platform]
force_binary_gate = true
"#;

    #[test]
    fn test_parse_sample() {
        let cfg = parse_config(SAMPLE).unwrap();
        assert_eq!(cfg.drive.fast_duty, 220);
        assert_eq!(cfg.drive.slow_duty, 140);
        assert_eq!(cfg.drive.default_duty, 160); // untouched default
        assert_eq!(cfg.range.echo_timeout_us, 25_000);
        assert_eq!(cfg.range.debounce_hits, 4);
        assert_eq!(cfg.scan.mode, ScanMode::Sweep);
        assert_eq!(cfg.scan.sweep_interval_ms, 150);
        assert_eq!(cfg.watchdog.live_timeout_ms, 800);
        assert_eq!(cfg.telemetry.verbose, Some(false));
        assert!(cfg.platform.force_binary_gate);
    }

    #[test]
    fn test_empty_input_is_defaults() {
        assert_eq!(parse_config(""), Ok(RoverConfig::default()));
        assert_eq!(parse_config("# nothing\n\n"), Ok(RoverConfig::default()));
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(
            parse_config("[motors]\nx = 1\n"),
            Err(ConfigError::InvalidSection)
        );
        assert_eq!(parse_config("[drive\n"), Err(ConfigError::InvalidSection));
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            parse_config("[drive]\nturbo = 1\n"),
            Err(ConfigError::UnknownKey)
        );
        assert_eq!(parse_config("fast_duty = 200\n"), Err(ConfigError::UnknownKey));
    }

    #[test]
    fn test_invalid_values() {
        // Out of range for u8
        assert_eq!(
            parse_config("[drive]\nfast_duty = 300\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_config("[drive]\nfast_duty = -1\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_config("[telemetry]\nverbose = yes\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_config("[scan]\nmode = sweep\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(parse_config("[drive]\nfast_duty =\n"), Err(ConfigError::InvalidValue));
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let text = "[scan]\nsettle_ms = 200\nsweep_interval_ms = 120\n";
        assert!(matches!(
            parse_config(text),
            Err(ConfigError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_hash_inside_string_kept() {
        assert_eq!(strip_comment(r#""a#b" # note"#), r#""a#b" "#);
    }

    #[test]
    fn test_firmware_config_matches_defaults() {
        let shipped = include_str!("../../../picket-firmware/rover.toml");
        assert_eq!(parse_config(shipped), Ok(RoverConfig::default()));
    }
}
