//! Shift lever vocabulary: lever positions, park button, gears and the
//! gear indication byte shown on the lever's display.

/// Raw lever position reported in byte 2 of the lever position frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LeverPosition {
    /// Resting in the middle of the main gate
    Center,
    /// Pushed up one notch
    Up1,
    /// Pushed up two notches
    Up2,
    /// Pulled down one notch
    Down1,
    /// Pulled down two notches
    Down2,
    /// Resting in the side (manual) gate
    CenterSide,
    /// Side gate, pushed up
    SideUp,
    /// Side gate, pulled down
    SideDown,
    /// Byte not in the known set; kept so edge detection stays faithful
    Unknown(u8),
}

impl LeverPosition {
    /// All known positions
    pub const KNOWN: [LeverPosition; 8] = [
        LeverPosition::Center,
        LeverPosition::Up1,
        LeverPosition::Up2,
        LeverPosition::Down1,
        LeverPosition::Down2,
        LeverPosition::CenterSide,
        LeverPosition::SideUp,
        LeverPosition::SideDown,
    ];

    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x0E => LeverPosition::Center,
            0x1E => LeverPosition::Up1,
            0x2E => LeverPosition::Up2,
            0x3E => LeverPosition::Down1,
            0x4E => LeverPosition::Down2,
            0x7E => LeverPosition::CenterSide,
            0x5E => LeverPosition::SideUp,
            0x6E => LeverPosition::SideDown,
            other => LeverPosition::Unknown(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            LeverPosition::Center => 0x0E,
            LeverPosition::Up1 => 0x1E,
            LeverPosition::Up2 => 0x2E,
            LeverPosition::Down1 => 0x3E,
            LeverPosition::Down2 => 0x4E,
            LeverPosition::CenterSide => 0x7E,
            LeverPosition::SideUp => 0x5E,
            LeverPosition::SideDown => 0x6E,
            LeverPosition::Unknown(byte) => byte,
        }
    }
}

/// Park button state reported in byte 3 of the lever position frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParkButton {
    Normal,
    Pressed,
}

impl ParkButton {
    pub const NORMAL_BYTE: u8 = 0xC0;
    pub const PRESSED_BYTE: u8 = 0xD5;

    /// Only the exact pressed pattern counts as pressed
    pub fn from_byte(byte: u8) -> Self {
        if byte == Self::PRESSED_BYTE {
            ParkButton::Pressed
        } else {
            ParkButton::Normal
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            ParkButton::Normal => Self::NORMAL_BYTE,
            ParkButton::Pressed => Self::PRESSED_BYTE,
        }
    }

    pub fn is_pressed(self) -> bool {
        self == ParkButton::Pressed
    }
}

/// Selected gear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gear {
    /// Park
    #[default]
    P,
    /// Reverse
    R,
    /// Neutral
    N,
    /// Drive
    D,
    /// Manual (sequential)
    M,
}

impl Gear {
    pub const ALL: [Gear; 5] = [Gear::P, Gear::R, Gear::N, Gear::D, Gear::M];

    /// Single-letter name used on the serial channel
    pub fn as_str(self) -> &'static str {
        match self {
            Gear::P => "P",
            Gear::R => "R",
            Gear::N => "N",
            Gear::D => "D",
            Gear::M => "M",
        }
    }

    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "P" => Some(Gear::P),
            "R" => Some(Gear::R),
            "N" => Some(Gear::N),
            "D" => Some(Gear::D),
            "M" => Some(Gear::M),
            _ => None,
        }
    }
}

/// What the lever's display shows
///
/// Drive, Manual and Manual-with-lever-in-side-gate share one wire byte but
/// are kept apart because the gamepad treats them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GearIndication {
    Park,
    Reverse,
    Neutral,
    Drive,
    Manual,
    /// Manual with the lever resting in the side gate
    ManualSide,
}

impl GearIndication {
    /// Flash overlay bit
    pub const FLASH_BIT: u8 = 0x08;

    /// Indication for a gear, ignoring lever position
    pub fn from_gear(gear: Gear) -> Self {
        match gear {
            Gear::P => GearIndication::Park,
            Gear::R => GearIndication::Reverse,
            Gear::N => GearIndication::Neutral,
            Gear::D => GearIndication::Drive,
            Gear::M => GearIndication::Manual,
        }
    }

    /// Wire byte, with the flash bit overlaid when `flash` is set
    pub fn to_byte(self, flash: bool) -> u8 {
        let base = match self {
            GearIndication::Park => 0x20,
            GearIndication::Reverse => 0x40,
            GearIndication::Neutral => 0x60,
            GearIndication::Drive | GearIndication::Manual | GearIndication::ManualSide => 0x81,
        };
        if flash {
            base | Self::FLASH_BIT
        } else {
            base
        }
    }
}
