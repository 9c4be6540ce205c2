//! USB HID gamepad report
//!
//! Report layout (report ID 1, 11 bytes):
//! ```text
//! ┌──────────────────────────┬─────┬───────────────────────┐
//! │ X  Y  Z  Rz Rx Ry (i8)   │ HAT │ BUTTONS (u32, LE)     │
//! │ bytes 0..=5              │ 6   │ bytes 7..=10          │
//! └──────────────────────────┴─────┴───────────────────────┘
//! ```
//!
//! Axes stay neutral and the hat stays centered; only eight of the 32
//! button bits are ever driven.

/// HID report ID of the gamepad report
pub const REPORT_ID: u8 = 1;

/// Size of the report body (without the report ID byte)
pub const REPORT_SIZE: usize = 11;

/// Hat value outside the logical range 1..=8, reported as the null state
pub const HAT_CENTERED: u8 = 0;

/// HID report descriptor: 6 axes, one hat switch, 32 buttons
pub const REPORT_DESCRIPTOR: [u8; 68] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Game Pad)
    0xA1, 0x01, // Collection (Application)
    0x85, REPORT_ID, //   Report ID
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x09, 0x33, //   Usage (Rx)
    0x09, 0x34, //   Usage (Ry)
    0x15, 0x81, //   Logical Minimum (-127)
    0x25, 0x7F, //   Logical Maximum (127)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x02, //   Input (Data, Var, Abs)
    0x09, 0x39, //   Usage (Hat switch)
    0x15, 0x01, //   Logical Minimum (1)
    0x25, 0x08, //   Logical Maximum (8)
    0x35, 0x00, //   Physical Minimum (0)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x65, 0x14, //   Unit (Degrees)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x42, //   Input (Data, Var, Abs, Null)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x20, //   Usage Maximum (32)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x20, //   Report Count (32)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Var, Abs)
    0xC0, // End Collection
];

/// The eight gamepad buttons the bridge drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidButton {
    Park,
    Neutral,
    Reverse,
    Drive,
    Manual,
    Plus,
    Minus,
    Unlock,
}

impl HidButton {
    /// Buttons driven by the gear and shift logic (everything but Unlock)
    pub const GEAR_AND_SHIFT: [HidButton; 7] = [
        HidButton::Park,
        HidButton::Reverse,
        HidButton::Neutral,
        HidButton::Drive,
        HidButton::Manual,
        HidButton::Plus,
        HidButton::Minus,
    ];

    /// 1-based gamepad button number as seen by the host
    pub fn gamepad_number(self) -> u8 {
        match self {
            HidButton::Neutral => 1,
            HidButton::Reverse => 2,
            HidButton::Drive => 3,
            HidButton::Manual => 4,
            HidButton::Park => 5,
            HidButton::Plus => 30,
            HidButton::Minus => 31,
            HidButton::Unlock => 32,
        }
    }

    /// Bit in the report's button field
    pub fn mask(self) -> u32 {
        1u32 << (self.gamepad_number() - 1)
    }

    /// Single-character identifier used on the serial channel
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'P' => Some(HidButton::Park),
            'N' => Some(HidButton::Neutral),
            'R' => Some(HidButton::Reverse),
            'D' => Some(HidButton::Drive),
            'M' => Some(HidButton::Manual),
            '+' => Some(HidButton::Plus),
            '-' => Some(HidButton::Minus),
            'U' | 'u' => Some(HidButton::Unlock),
            _ => None,
        }
    }
}

/// Press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    Press,
    Release,
}

/// Gamepad input report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GamepadReport {
    /// X, Y, Z, Rz, Rx, Ry
    pub axes: [i8; 6],
    pub hat: u8,
    /// Bit n-1 = button n
    pub buttons: u32,
}

impl Default for GamepadReport {
    fn default() -> Self {
        Self::neutral()
    }
}

impl GamepadReport {
    /// Axes centered, hat centered, nothing pressed
    pub const fn neutral() -> Self {
        Self {
            axes: [0; 6],
            hat: HAT_CENTERED,
            buttons: 0,
        }
    }

    /// Apply a press or release; returns true if the report changed
    pub fn apply(&mut self, button: HidButton, action: ButtonAction) -> bool {
        let before = self.buttons;
        match action {
            ButtonAction::Press => self.buttons |= button.mask(),
            ButtonAction::Release => self.buttons &= !button.mask(),
        }
        before != self.buttons
    }

    pub fn is_pressed(&self, button: HidButton) -> bool {
        self.buttons & button.mask() != 0
    }

    /// Serialize the report body
    pub fn encode(&self) -> [u8; REPORT_SIZE] {
        let mut out = [0u8; REPORT_SIZE];
        for (dst, axis) in out.iter_mut().zip(self.axes) {
            *dst = axis as u8;
        }
        out[6] = self.hat;
        out[7..].copy_from_slice(&self.buttons.to_le_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_numbers() {
        assert_eq!(HidButton::Neutral.gamepad_number(), 1);
        assert_eq!(HidButton::Reverse.gamepad_number(), 2);
        assert_eq!(HidButton::Drive.gamepad_number(), 3);
        assert_eq!(HidButton::Manual.gamepad_number(), 4);
        assert_eq!(HidButton::Park.gamepad_number(), 5);
        assert_eq!(HidButton::Plus.gamepad_number(), 30);
        assert_eq!(HidButton::Minus.gamepad_number(), 31);
        assert_eq!(HidButton::Unlock.gamepad_number(), 32);
        assert_eq!(HidButton::Unlock.mask(), 0x8000_0000);
    }

    #[test]
    fn test_button_chars() {
        for c in ['P', 'N', 'R', 'D', 'M', '+', '-', 'U', 'u'] {
            assert!(HidButton::from_char(c).is_some());
        }
        assert_eq!(HidButton::from_char('x'), None);
    }

    #[test]
    fn test_report_apply() {
        let mut report = GamepadReport::neutral();
        assert!(report.apply(HidButton::Reverse, ButtonAction::Press));
        assert!(!report.apply(HidButton::Reverse, ButtonAction::Press));
        assert!(report.is_pressed(HidButton::Reverse));
        assert!(report.apply(HidButton::Plus, ButtonAction::Press));
        assert!(report.apply(HidButton::Reverse, ButtonAction::Release));
        assert_eq!(report.buttons, HidButton::Plus.mask());
    }

    #[test]
    fn test_report_encode() {
        let mut report = GamepadReport::neutral();
        report.apply(HidButton::Neutral, ButtonAction::Press);
        report.apply(HidButton::Minus, ButtonAction::Press);
        let bytes = report.encode();
        assert_eq!(&bytes[..6], &[0; 6]);
        assert_eq!(bytes[6], HAT_CENTERED);
        assert_eq!(&bytes[7..], &[0x01, 0x00, 0x00, 0x40]);
    }

    #[test]
    fn test_descriptor_framing() {
        assert_eq!(REPORT_DESCRIPTOR[0], 0x05);
        assert_eq!(REPORT_DESCRIPTOR[REPORT_DESCRIPTOR.len() - 1], 0xC0);
    }
}
