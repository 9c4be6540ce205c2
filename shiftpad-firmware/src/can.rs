//! Conversion between bus frames and protocol frames

use embassy_stm32::can::Frame;
use embedded_can::{Id, StandardId};

use shiftpad_protocol::{CanFrame, FrameError};

/// Convert a received frame
///
/// Extended-id frames are not part of the shifter protocol; they yield
/// `None` and are dropped by the caller.
pub fn from_bus(frame: &Frame) -> Option<CanFrame> {
    match frame.header().id() {
        Id::Standard(id) => CanFrame::new(id.as_raw(), frame.data()).ok(),
        Id::Extended(_) => None,
    }
}

/// Convert an outbound frame
pub fn to_bus(frame: &CanFrame) -> Result<Frame, FrameError> {
    let id = StandardId::new(frame.id).ok_or(FrameError::InvalidId)?;
    Frame::new_data(id, frame.data()).map_err(|_| FrameError::PayloadTooLarge)
}
