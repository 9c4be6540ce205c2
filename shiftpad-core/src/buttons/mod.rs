//! Button emulation
//!
//! Turns vehicle state changes into gamepad presses: timed pulses for
//! N, D, Plus and Minus, and a hold for R.

pub mod controller;
pub mod timer;

pub use controller::{ButtonController, DEFAULT_PULSE_MS};
pub use timer::ButtonTimer;
