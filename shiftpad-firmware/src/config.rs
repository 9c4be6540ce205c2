//! Configuration loading
//!
//! The bridge has no writable storage for settings. Configuration is
//! `shifter.toml`, embedded at compile time and validated by `build.rs`.
//! Parsing happens once at boot with the core no_std parser.

use defmt::*;

use shiftpad_core::config::{parse_config, ShifterConfig};

/// Embedded configuration (compiled into firmware)
/// Edit shifter.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../shifter.toml");

/// Parse the embedded configuration
///
/// Falls back to built-in defaults if parsing fails. That can only happen
/// when the on-device parser disagrees with the build-time validation.
pub fn load_config() -> ShifterConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in defaults");
            ShifterConfig::default()
        }
    }
}
