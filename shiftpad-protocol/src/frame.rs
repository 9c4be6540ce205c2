//! Classic CAN data frame with an 11-bit identifier.
//!
//! Frames carry 0-8 data bytes. Remote frames and extended identifiers are
//! never used by the gear lever and are not represented.

use heapless::Vec;

/// Maximum data length of a classic CAN frame
pub const MAX_DLC: usize = 8;

/// Largest 11-bit standard identifier
pub const MAX_STANDARD_ID: u16 = 0x7FF;

/// Frame identifiers used on the shifter bus
pub mod can_ids {
    /// Lever position telemetry from the shifter (every ~30ms)
    pub const LEVER_POSITION: u16 = 0x197;
    /// Heartbeat beacon (sent by us, also echoed by the shifter)
    pub const HEARTBEAT: u16 = 0x55E;
    /// Gear indication shown on the shifter's own display
    pub const GEAR_DISPLAY: u16 = 0x3FD;
    /// Backlight level for the shifter's symbols
    pub const BACKLIGHT: u16 = 0x202;
}

/// Errors that can occur while building or decoding frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds 8 bytes
    PayloadTooLarge,
    /// Identifier does not fit in 11 bits
    InvalidId,
    /// Payload shorter than the layout requires
    TooShort,
}

/// A CAN data frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrame {
    /// 11-bit identifier
    pub id: u16,
    /// Data bytes (DLC = length)
    pub payload: Vec<u8, MAX_DLC>,
}

impl CanFrame {
    /// Create a new frame from an identifier and data bytes
    pub fn new(id: u16, payload: &[u8]) -> Result<Self, FrameError> {
        if id > MAX_STANDARD_ID {
            return Err(FrameError::InvalidId);
        }
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { id, payload })
    }

    /// Data length code
    pub fn dlc(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Data bytes
    pub fn data(&self) -> &[u8] {
        &self.payload
    }

    /// Mutable data bytes, for in-place stamping
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.payload
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CanFrame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "CanFrame {{ id: {=u16:#05x}, data: {=[u8]:02x} }}",
            self.id,
            &self.payload[..]
        )
    }
}
