//! Configuration types and the embedded config parser

pub mod parse;
pub mod types;

pub use parse::{parse_config, ConfigError};
pub use types::{CanConfig, DisplayConfig, SerialConfig, ShifterConfig, TimingConfig};
