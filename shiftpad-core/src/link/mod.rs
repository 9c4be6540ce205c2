//! Shifter link supervision
//!
//! Detects when the shifter goes silent and when it comes back.

pub mod monitor;

pub use monitor::{LinkEvent, LinkMonitor, DEFAULT_LINK_TIMEOUT_MS};
