//! Simple TOML parser for the bridge configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the shifter configuration. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - [section] headers
//! - Key = value pairs (decimal or 0x-prefixed integer, boolean)
//! - Comments (# ...), whole-line or trailing
//!
//! Keys missing from the input keep their default value. Unknown sections
//! and keys are errors, so a typo never silently falls back to a default.

use super::types::{CanConfig, DisplayConfig, SerialConfig, ShifterConfig, TimingConfig};

/// Configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Line is neither a section header nor `key = value`
    Syntax { line: usize },
    /// Unknown section header
    InvalidSection { line: usize },
    /// Key not valid in its section
    UnknownKey { line: usize },
    /// Value does not parse or is out of range
    InvalidValue { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Timing,
    Display,
    Can,
    Serial,
}

/// Parse TOML configuration into a [`ShifterConfig`]
pub fn parse_config(input: &str) -> Result<ShifterConfig, ConfigError> {
    let mut config = ShifterConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(ConfigError::Syntax { line: line_no });
            }
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(ConfigError::InvalidSection { line: line_no })?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::Syntax { line: line_no })?;
        apply_value(&mut config, section, key, value, line_no)?;
    }

    validate(&config)?;
    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "timing" => Some(Section::Timing),
        "display" => Some(Section::Display),
        "can" => Some(Section::Can),
        "serial" => Some(Section::Serial),
        _ => None,
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse an unsigned integer, decimal or `0x` hex, with `_` separators
fn parse_int(value: &str) -> Option<u64> {
    let mut digits = [0u8; 24];
    let mut len = 0;
    for byte in value.bytes().filter(|&b| b != b'_') {
        *digits.get_mut(len)? = byte;
        len += 1;
    }
    let cleaned = core::str::from_utf8(&digits[..len]).ok()?;

    match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => cleaned.parse().ok(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn apply_value(
    config: &mut ShifterConfig,
    section: Section,
    key: &str,
    value: &str,
    line: usize,
) -> Result<(), ConfigError> {
    let invalid = ConfigError::InvalidValue { line };
    let int = || parse_int(value).ok_or(invalid);
    let boolean = || parse_bool(value).ok_or(invalid);

    match section {
        Section::Timing => {
            let t: &mut TimingConfig = &mut config.timing;
            let field = match key {
                "gear_display_ms" => &mut t.gear_display_ms,
                "backlight_ms" => &mut t.backlight_ms,
                "heartbeat_ms" => &mut t.heartbeat_ms,
                "hid_tick_ms" => &mut t.hid_tick_ms,
                "supervisor_ms" => &mut t.supervisor_ms,
                "link_timeout_ms" => &mut t.link_timeout_ms,
                "pulse_ms" => &mut t.pulse_ms,
                _ => return Err(ConfigError::UnknownKey { line }),
            };
            *field = int()?;
        }
        Section::Display => {
            let d: &mut DisplayConfig = &mut config.display;
            match key {
                "backlight" => d.backlight = u8::try_from(int()?).map_err(|_| invalid)?,
                "flash_indication" => d.flash_indication = boolean()?,
                "stamp_backlight_counter" => d.stamp_backlight_counter = boolean()?,
                _ => return Err(ConfigError::UnknownKey { line }),
            }
        }
        Section::Can => {
            let c: &mut CanConfig = &mut config.can;
            match key {
                "bitrate" => c.bitrate = u32::try_from(int()?).map_err(|_| invalid)?,
                "bus_id" => c.bus_id = u8::try_from(int()?).map_err(|_| invalid)?,
                _ => return Err(ConfigError::UnknownKey { line }),
            }
        }
        Section::Serial => {
            let s: &mut SerialConfig = &mut config.serial;
            match key {
                "baud" => s.baud = u32::try_from(int()?).map_err(|_| invalid)?,
                "report_interval_ms" => s.report_interval_ms = int()?,
                "can_log_interval_ms" => s.can_log_interval_ms = int()?,
                _ => return Err(ConfigError::UnknownKey { line }),
            }
        }
        Section::Root => return Err(ConfigError::UnknownKey { line }),
    }

    Ok(())
}

/// Range checks that span a whole section
///
/// Errors from here carry line 0.
fn validate(config: &ShifterConfig) -> Result<(), ConfigError> {
    let t = &config.timing;
    let periods = [
        t.gear_display_ms,
        t.backlight_ms,
        t.heartbeat_ms,
        t.hid_tick_ms,
        t.supervisor_ms,
        t.link_timeout_ms,
        t.pulse_ms,
    ];
    if periods.contains(&0) {
        return Err(ConfigError::InvalidValue { line: 0 });
    }
    if config.display.backlight > 254 || config.can.bitrate == 0 || config.serial.baud == 0 {
        return Err(ConfigError::InvalidValue { line: 0 });
    }
    Ok(())
}
