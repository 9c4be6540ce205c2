//! Shiftpad wire protocols
//!
//! This crate defines everything that crosses a wire:
//!
//! - CAN frames exchanged with the gear lever (position, heartbeat,
//!   gear display, backlight)
//! - The frame codec that stamps outbound frames with a rolling counter and
//!   a table-driven checksum
//! - The line-oriented JSON command channel and telemetry reports on the
//!   serial port
//! - The 11-byte USB HID gamepad report
//!
//! # CAN frame layout
//!
//! Frames that use the checksum scheme share a common header:
//! ```text
//! ┌──────────┬──────────────────┬─────────────────────┐
//! │ CHECKSUM │ FLAGS | COUNTER  │ PAYLOAD             │
//! │ byte 0   │ byte 1 (hi | lo) │ bytes 2..=7         │
//! └──────────┴──────────────────┴─────────────────────┘
//! ```
//!
//! The checksum covers bytes 1.. (including the counter nibble). The receive
//! path never verifies it.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod checksum;
pub mod codec;
pub mod commands;
pub mod frame;
pub mod hid;
pub mod messages;
pub mod shifter;
pub mod telemetry;

pub use checksum::{checksum, checksum_seed, stamp_policy, StampPolicy};
pub use codec::{CounterTable, FrameCodec, StampOutcome, COUNTER_MODULUS};
pub use commands::{BacklightLevel, Command, CommandError, CommandReader};
pub use frame::{can_ids, CanFrame, FrameError, MAX_DLC};
pub use hid::{ButtonAction, GamepadReport, HidButton, REPORT_DESCRIPTOR, REPORT_ID, REPORT_SIZE};
pub use messages::{BacklightMsg, GearDisplayMsg, HeartbeatMsg, LeverPositionMsg, ShifterMessage};
pub use shifter::{Gear, GearIndication, LeverPosition, ParkButton};
pub use telemetry::{encode_json, CanRxReport, StateReport, TelemetryError};
