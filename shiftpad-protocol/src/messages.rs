//! Frame layouts exchanged with the gear lever
//!
//! Lever → us: position telemetry, heartbeat.
//! Us → lever: gear display, backlight, heartbeat.
//!
//! Builders leave byte 0 and the counter nibble at zero; the frame codec
//! fills them in before transmission.

use crate::commands::BacklightLevel;
use crate::frame::{can_ids, CanFrame, FrameError};
use crate::shifter::{GearIndication, LeverPosition, ParkButton};

/// Constant trailer of the gear display frame
const GEAR_DISPLAY_TRAILER: [u8; 2] = [0x0C, 0xFF];

/// Last byte of the heartbeat frame
pub const HEARTBEAT_MAGIC: u8 = 0x5E;

/// Lever position telemetry: `[chk, cnt|flags, lever_pos, park_state]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LeverPositionMsg {
    pub lever: LeverPosition,
    pub park: ParkButton,
}

impl LeverPositionMsg {
    /// Decode from a received frame; the checksum is not verified
    pub fn from_frame(frame: &CanFrame) -> Result<Self, FrameError> {
        let data = frame.data();
        if data.len() < 4 {
            return Err(FrameError::TooShort);
        }
        Ok(Self {
            lever: LeverPosition::from_byte(data[2]),
            park: ParkButton::from_byte(data[3]),
        })
    }

    /// Encode as the shifter would send it (for testing or simulation)
    pub fn to_frame(&self) -> Result<CanFrame, FrameError> {
        CanFrame::new(
            can_ids::LEVER_POSITION,
            &[0x00, 0x00, self.lever.to_byte(), self.park.to_byte()],
        )
    }
}

/// Inbound frames the bridge cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShifterMessage {
    LeverPosition(LeverPositionMsg),
    Heartbeat,
    /// Any other identifier on the bus
    Other(u16),
}

impl ShifterMessage {
    /// Classify a received frame
    pub fn from_frame(frame: &CanFrame) -> Result<Self, FrameError> {
        match frame.id {
            can_ids::LEVER_POSITION => {
                LeverPositionMsg::from_frame(frame).map(ShifterMessage::LeverPosition)
            }
            can_ids::HEARTBEAT => Ok(ShifterMessage::Heartbeat),
            other => Ok(ShifterMessage::Other(other)),
        }
    }

    /// True for frames that prove the shifter is alive
    pub fn is_liveness(&self) -> bool {
        !matches!(self, ShifterMessage::Other(_))
    }
}

/// Gear display: `[chk, cnt|flags, gear_indication, 0x0C, 0xFF]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GearDisplayMsg {
    pub indication: GearIndication,
    pub flash: bool,
}

impl GearDisplayMsg {
    pub fn to_frame(&self) -> Result<CanFrame, FrameError> {
        CanFrame::new(
            can_ids::GEAR_DISPLAY,
            &[
                0x00,
                0x00,
                self.indication.to_byte(self.flash),
                GEAR_DISPLAY_TRAILER[0],
                GEAR_DISPLAY_TRAILER[1],
            ],
        )
    }
}

/// Backlight: `[level, 0x00]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BacklightMsg {
    pub level: BacklightLevel,
}

impl BacklightMsg {
    pub fn to_frame(&self) -> Result<CanFrame, FrameError> {
        CanFrame::new(can_ids::BACKLIGHT, &[self.level.get(), 0x00])
    }
}

/// Heartbeat: `[0, 0, 0, 0, bus_id, 0, 0, 0x5E]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeartbeatMsg {
    /// 0x01 for PT-CAN, 0x02 for PT-CAN2
    pub bus_id: u8,
}

impl HeartbeatMsg {
    pub fn to_frame(&self) -> Result<CanFrame, FrameError> {
        CanFrame::new(
            can_ids::HEARTBEAT,
            &[0, 0, 0, 0, self.bus_id, 0, 0, HEARTBEAT_MAGIC],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lever_position_decode() {
        let frame = CanFrame::new(can_ids::LEVER_POSITION, &[0x3D, 0x05, 0x1E, 0xC0]).unwrap();
        let msg = LeverPositionMsg::from_frame(&frame).unwrap();
        assert_eq!(msg.lever, LeverPosition::Up1);
        assert_eq!(msg.park, ParkButton::Normal);
    }

    #[test]
    fn test_lever_position_ignores_checksum() {
        let frame = CanFrame::new(can_ids::LEVER_POSITION, &[0xFF, 0xFF, 0x0E, 0xD5]).unwrap();
        let msg = LeverPositionMsg::from_frame(&frame).unwrap();
        assert_eq!(msg.lever, LeverPosition::Center);
        assert_eq!(msg.park, ParkButton::Pressed);
    }

    #[test]
    fn test_short_lever_frame_rejected() {
        let frame = CanFrame::new(can_ids::LEVER_POSITION, &[0x00, 0x00, 0x0E]).unwrap();
        assert_eq!(
            ShifterMessage::from_frame(&frame),
            Err(FrameError::TooShort)
        );
    }

    #[test]
    fn test_classify() {
        let hb = CanFrame::new(can_ids::HEARTBEAT, &[0; 8]).unwrap();
        assert_eq!(ShifterMessage::from_frame(&hb), Ok(ShifterMessage::Heartbeat));

        let other = CanFrame::new(0x130, &[0; 5]).unwrap();
        let msg = ShifterMessage::from_frame(&other).unwrap();
        assert_eq!(msg, ShifterMessage::Other(0x130));
        assert!(!msg.is_liveness());
    }

    #[test]
    fn test_gear_display_layout() {
        let msg = GearDisplayMsg {
            indication: GearIndication::Neutral,
            flash: false,
        };
        let frame = msg.to_frame().unwrap();
        assert_eq!(frame.id, can_ids::GEAR_DISPLAY);
        assert_eq!(frame.data(), &[0x00, 0x00, 0x60, 0x0C, 0xFF]);
    }

    #[test]
    fn test_backlight_layout() {
        let msg = BacklightMsg {
            level: BacklightLevel::new(200).unwrap(),
        };
        assert_eq!(msg.to_frame().unwrap().data(), &[200, 0x00]);
    }

    #[test]
    fn test_heartbeat_layout() {
        let frame = HeartbeatMsg { bus_id: 0x02 }.to_frame().unwrap();
        assert_eq!(frame.id, can_ids::HEARTBEAT);
        assert_eq!(frame.data(), &[0, 0, 0, 0, 0x02, 0, 0, 0x5E]);
    }
}
