//! Board-agnostic core logic for the shifter bridge
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Vehicle state and the gear lever state machine
//! - Shared vehicle state with a single writer and snapshot readers
//! - Button emulation controller (timed and held gamepad presses)
//! - Shared gamepad report used by the controller and the serial command path
//! - Link monitoring (shifter silence detection)
//! - Periodic frame emitters
//! - Telemetry rate limiting
//! - Configuration type definitions and the embedded config parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buttons;
pub mod config;
pub mod emitter;
pub mod gamepad;
pub mod link;
pub mod shared;
pub mod state;
pub mod throttle;
pub mod traits;
