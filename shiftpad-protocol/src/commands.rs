//! Serial command channel
//!
//! Commands arrive as one JSON object per line:
//!
//! ```text
//! {"type":"set_backlight","level":120}
//! {"type":"set_gear_indication","gear":"R"}
//! {"type":"hid_button","button":"+","action":"press"}
//! ```
//!
//! A line is validated as a whole. Anything malformed, unknown or out of
//! range rejects the entire line and nothing is applied.

use heapless::Vec;
use serde::Deserialize;

use crate::hid::{ButtonAction, HidButton};
use crate::shifter::Gear;

/// Longest accepted command line (without the newline)
pub const MAX_LINE_LEN: usize = 128;

/// Backlight level in `0..=254`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BacklightLevel(u8);

impl BacklightLevel {
    pub const MIN: BacklightLevel = BacklightLevel(0);
    pub const MAX: BacklightLevel = BacklightLevel(254);

    /// Returns `None` above 254
    pub fn new(level: u16) -> Option<Self> {
        if level <= Self::MAX.0 as u16 {
            Some(Self(level as u8))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for BacklightLevel {
    fn default() -> Self {
        Self::MAX
    }
}

/// Reasons a command line is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Not valid JSON, or not UTF-8
    Malformed,
    /// `type` is not a known command
    UnknownType,
    /// A field the command needs is absent
    MissingField,
    /// Backlight level outside 0..=254
    OutOfRange,
    /// Gear is not one of P/R/N/D/M
    UnknownGear,
    /// Button identifier is not one of P N R D M + - U
    UnknownButton,
    /// Action is neither "press" nor "release"
    UnknownAction,
    /// Line exceeded [`MAX_LINE_LEN`]
    LineTooLong,
}

/// A validated command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    SetBacklight(BacklightLevel),
    SetGearIndication(Gear),
    Button {
        button: HidButton,
        action: ButtonAction,
    },
}

/// Wire shape before validation
#[derive(Deserialize)]
struct RawCommand<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    level: Option<i32>,
    #[serde(borrow)]
    gear: Option<&'a str>,
    #[serde(borrow)]
    button: Option<&'a str>,
    #[serde(borrow)]
    action: Option<&'a str>,
}

impl Command {
    /// Parse and validate one command line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let (raw, _) = serde_json_core::from_str::<RawCommand<'_>>(line.trim())
            .map_err(|_| CommandError::Malformed)?;

        match raw.kind {
            "set_backlight" => {
                let level = raw.level.ok_or(CommandError::MissingField)?;
                u16::try_from(level)
                    .ok()
                    .and_then(BacklightLevel::new)
                    .map(Command::SetBacklight)
                    .ok_or(CommandError::OutOfRange)
            }
            "set_gear_indication" => {
                let gear = raw.gear.ok_or(CommandError::MissingField)?;
                Gear::from_letter(gear)
                    .map(Command::SetGearIndication)
                    .ok_or(CommandError::UnknownGear)
            }
            "hid_button" => {
                let button = raw.button.ok_or(CommandError::MissingField)?;
                let action = raw.action.ok_or(CommandError::MissingField)?;

                let mut chars = button.chars();
                let button = match (chars.next(), chars.next()) {
                    (Some(c), None) => HidButton::from_char(c),
                    _ => None,
                }
                .ok_or(CommandError::UnknownButton)?;

                let action = match action {
                    "press" => ButtonAction::Press,
                    "release" => ButtonAction::Release,
                    _ => return Err(CommandError::UnknownAction),
                };

                Ok(Command::Button { button, action })
            }
            _ => Err(CommandError::UnknownType),
        }
    }
}

/// Assembles serial bytes into lines and parses each line as a command
#[derive(Debug, Clone, Default)]
pub struct CommandReader {
    buffer: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl CommandReader {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Some` once a non-empty line is complete.
    pub fn feed(&mut self, byte: u8) -> Option<Result<Command, CommandError>> {
        match byte {
            b'\n' => {
                let result = if self.overflowed {
                    Some(Err(CommandError::LineTooLong))
                } else if self.buffer.iter().all(|b| b.is_ascii_whitespace()) {
                    None
                } else {
                    Some(
                        core::str::from_utf8(&self.buffer)
                            .map_err(|_| CommandError::Malformed)
                            .and_then(Command::parse),
                    )
                };
                self.reset();
                result
            }
            b'\r' => None,
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.overflowed = true;
                }
                None
            }
        }
    }
}
