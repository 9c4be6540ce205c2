//! Serial telemetry reports
//!
//! Reports are newline-terminated JSON objects so a host tool can read the
//! serial port line by line:
//!
//! ```text
//! {"type":"shifter_state","gear":"N","lever_pos":30,"park":false,"manual":0}
//! {"type":"can_rx","id":407,"data":[61,5,30,192],"dlc":4}
//! ```

use serde::Serialize;

use crate::frame::CanFrame;
use crate::shifter::{Gear, LeverPosition, ParkButton};

/// Errors while encoding a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError {
    /// Output buffer too small
    BufferTooSmall,
}

/// Shifter state report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateReport {
    #[serde(rename = "type")]
    kind: &'static str,
    gear: &'static str,
    lever_pos: u8,
    park: bool,
    manual: u16,
}

impl StateReport {
    pub fn new(gear: Gear, lever: LeverPosition, park: ParkButton, manual: u16) -> Self {
        Self {
            kind: "shifter_state",
            gear: gear.as_str(),
            lever_pos: lever.to_byte(),
            park: park.is_pressed(),
            manual,
        }
    }
}

/// Raw received frame report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanRxReport<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: u16,
    data: &'a [u8],
    dlc: u8,
}

impl<'a> CanRxReport<'a> {
    pub fn new(frame: &'a CanFrame) -> Self {
        Self {
            kind: "can_rx",
            id: frame.id,
            data: frame.data(),
            dlc: frame.dlc(),
        }
    }
}

/// Encode a report as one JSON line into `buf`
///
/// Returns the number of bytes written, including the trailing newline.
pub fn encode_json<T: Serialize>(report: &T, buf: &mut [u8]) -> Result<usize, TelemetryError> {
    let len = serde_json_core::to_slice(report, buf).map_err(|_| TelemetryError::BufferTooSmall)?;
    let newline = buf.get_mut(len).ok_or(TelemetryError::BufferTooSmall)?;
    *newline = b'\n';
    Ok(len + 1)
}
