//! Configuration type definitions
//!
//! Configuration is compiled into the firmware image and never written
//! back at runtime.

use shiftpad_protocol::BacklightLevel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Task periods and timeouts, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Gear display frame period
    pub gear_display_ms: u64,
    /// Backlight frame period
    pub backlight_ms: u64,
    /// Heartbeat frame period
    pub heartbeat_ms: u64,
    /// HID maintenance tick
    pub hid_tick_ms: u64,
    /// Link supervision period
    pub supervisor_ms: u64,
    /// Silence before the shifter counts as disconnected
    pub link_timeout_ms: u64,
    /// Length of a timed button press
    pub pulse_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            gear_display_ms: 100,
            backlight_ms: 1000,
            heartbeat_ms: 640,
            hid_tick_ms: 10,
            supervisor_ms: 1000,
            link_timeout_ms: 2000,
            pulse_ms: 80,
        }
    }
}

/// Lever display settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Backlight level at boot (0..=254)
    pub backlight: u8,
    /// Set the flash bit on every gear indication
    pub flash_indication: bool,
    /// Put a rolling counter into backlight frames
    pub stamp_backlight_counter: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            backlight: BacklightLevel::MAX.get(),
            flash_indication: false,
            stamp_backlight_counter: false,
        }
    }
}

impl DisplayConfig {
    pub fn backlight_level(&self) -> BacklightLevel {
        BacklightLevel::new(self.backlight as u16).unwrap_or_default()
    }
}

/// CAN bus settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanConfig {
    pub bitrate: u32,
    /// Bus id carried in the heartbeat (0x01 PT-CAN, 0x02 PT-CAN2)
    pub bus_id: u8,
}

impl Default for CanConfig {
    fn default() -> Self {
        Self {
            bitrate: 500_000,
            bus_id: 0x02,
        }
    }
}

/// Serial command and telemetry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    pub baud: u32,
    /// Minimum spacing of shifter state reports
    pub report_interval_ms: u64,
    /// Minimum spacing of reports for frames other than lever position
    pub can_log_interval_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud: 115_200,
            report_interval_ms: 100,
            can_log_interval_ms: 500,
        }
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShifterConfig {
    pub timing: TimingConfig,
    pub display: DisplayConfig,
    pub can: CanConfig,
    pub serial: SerialConfig,
}
