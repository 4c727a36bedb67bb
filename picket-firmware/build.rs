//! Build script for picket-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates rover.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use picket_core::config::{parse_config, ConfigError};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate rover.toml at compile time
///
/// The firmware parses the same file again at boot and falls back to
/// defaults if it is rejected, so anything caught here is a rover that
/// would otherwise have booted with the wrong tuning.
fn validate_config() {
    println!("cargo:rerun-if-changed=rover.toml");

    let config_path = Path::new("rover.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: rover.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds rover.toml at build time.                   ║\n\
            ║  Please create one in the picket-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read rover.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Full TOML first for a precise syntax error with line and column
    if let Err(e) = toml::from_str::<toml::Value>(&config_content) {
        let error_msg = e.to_string();
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid TOML syntax in rover.toml                        ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            ║                                                                  ║\n\
            {}\n\
            ║                                                                  ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&error_msg)
        );
    }

    // Then the parser the firmware runs at boot
    if let Err(e) = parse_config(&config_content) {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: rover.toml rejected                                      ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&describe(e))
        );
    }

    println!("cargo:warning=rover.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable text for a configuration error
fn describe(e: ConfigError) -> String {
    match e {
        ConfigError::InvalidSection => "unknown or malformed [section] header".to_string(),
        ConfigError::UnknownKey => "key not valid in its section".to_string(),
        ConfigError::InvalidValue => "value has the wrong type or is out of range".to_string(),
        ConfigError::Inconsistent(why) => why.to_string(),
    }
}
