//! Build script for shiftpad-firmware
//!
//! - Passes the cortex-m-rt and defmt linker scripts
//! - Validates shifter.toml at compile time

use std::fs;
use std::path::Path;

/// Keys accepted in each section, with their allowed integer range
/// (booleans use `None`)
const SCHEMA: &[(&str, &[(&str, Option<(i64, i64)>)])] = &[
    (
        "timing",
        &[
            ("gear_display_ms", Some((1, 60_000))),
            ("backlight_ms", Some((1, 60_000))),
            ("heartbeat_ms", Some((1, 60_000))),
            ("hid_tick_ms", Some((1, 1_000))),
            ("supervisor_ms", Some((1, 60_000))),
            ("link_timeout_ms", Some((1, 600_000))),
            ("pulse_ms", Some((1, 10_000))),
        ],
    ),
    (
        "display",
        &[
            ("backlight", Some((0, 254))),
            ("flash_indication", None),
            ("stamp_backlight_counter", None),
        ],
    ),
    (
        "can",
        &[
            ("bitrate", Some((10_000, 1_000_000))),
            ("bus_id", Some((0, 255))),
        ],
    ),
    (
        "serial",
        &[
            ("baud", Some((1_200, 921_600))),
            ("report_interval_ms", Some((0, 60_000))),
            ("can_log_interval_ms", Some((0, 60_000))),
        ],
    ),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Linker scripts for cortex-m-rt and defmt
///
/// memory.x comes from embassy-stm32's `memory-x` feature.
fn setup_linker() {
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate shifter.toml configuration at compile time
fn validate_config() {
    // Re-run if shifter.toml changes
    println!("cargo:rerun-if-changed=shifter.toml");

    let config_path = Path::new("shifter.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: shifter.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds shifter.toml at compile time.               ║\n\
            ║  Please create one in the shiftpad-firmware directory.           ║\n\
            ║  An empty file selects the built-in defaults.                    ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read shifter.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in shifter.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = validate_sections(&config);
    errors.extend(validate_timing(&config));

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in shifter.toml                    ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=shifter.toml validated successfully");
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

/// Check every section and key against the schema
///
/// Mirrors the on-device parser, which rejects unknown sections and keys.
fn validate_sections(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return errors,
    };

    for (section_name, section) in root {
        let keys = match SCHEMA.iter().find(|(name, _)| *name == section_name.as_str()) {
            Some((_, keys)) => keys,
            None => {
                errors.push(format!("unknown section [{}]", section_name));
                continue;
            }
        };

        let section = match section {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[{}] must be a table", section_name));
                continue;
            }
        };

        for (key, value) in section {
            let range = match keys.iter().find(|(name, _)| *name == key.as_str()) {
                Some((_, range)) => range,
                None => {
                    errors.push(format!("[{}] unknown key '{}'", section_name, key));
                    continue;
                }
            };

            match (range, value) {
                (Some((min, max)), toml::Value::Integer(n)) => {
                    if n < min || n > max {
                        errors.push(format!(
                            "[{}] {} must be {}-{}",
                            section_name, key, min, max
                        ));
                    }
                }
                (Some(_), _) => {
                    errors.push(format!("[{}] {} must be an integer", section_name, key));
                }
                (None, toml::Value::Boolean(_)) => {}
                (None, _) => {
                    errors.push(format!("[{}] {} must be true or false", section_name, key));
                }
            }
        }
    }

    errors
}

/// Cross-field timing checks
fn validate_timing(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let get = |key: &str, default: i64| {
        config
            .get("timing")
            .and_then(|t| t.get(key))
            .and_then(|v| v.as_integer())
            .unwrap_or(default)
    };

    let supervisor_ms = get("supervisor_ms", 1000);
    let link_timeout_ms = get("link_timeout_ms", 2000);
    let hid_tick_ms = get("hid_tick_ms", 10);
    let pulse_ms = get("pulse_ms", 80);

    if link_timeout_ms < supervisor_ms {
        errors.push("[timing] link_timeout_ms must be >= supervisor_ms".to_string());
    }
    if pulse_ms < hid_tick_ms {
        errors.push("[timing] pulse_ms must be >= hid_tick_ms".to_string());
    }

    errors
}
