//! Inter-task communication
//!
//! Defines the statics shared between Embassy tasks. Vehicle state and the
//! gamepad report live in core types guarded by critical-section mutexes;
//! everything that flows one way goes through a channel or a signal.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::AtomicU8;

use shiftpad_core::gamepad::SharedGamepad;
use shiftpad_core::shared::SharedVehicleState;
use shiftpad_protocol::{BacklightLevel, CanFrame, StateReport};

/// Outbound CAN queue depth
const CAN_TX_QUEUE_SIZE: usize = 8;

/// Telemetry queue depth
const TELEMETRY_QUEUE_SIZE: usize = 8;

/// Something to report on the serial port
#[derive(Debug, Clone)]
pub enum Telemetry {
    /// Decoded shifter state after a lever frame
    State(StateReport),
    /// Any other received frame, throttled
    CanRx(CanFrame),
}

/// Gear state, written only by the CAN receive task
pub static VEHICLE: SharedVehicleState<CriticalSectionRawMutex> = SharedVehicleState::new();

/// Gamepad report shared by the button controller and the serial commands
pub static GAMEPAD: SharedGamepad<CriticalSectionRawMutex> = SharedGamepad::new();

/// Frames waiting for the CAN transmitter
pub static CAN_TX: Channel<CriticalSectionRawMutex, CanFrame, CAN_TX_QUEUE_SIZE> = Channel::new();

/// Reports waiting for the serial transmitter
pub static TELEMETRY: Channel<CriticalSectionRawMutex, Telemetry, TELEMETRY_QUEUE_SIZE> =
    Channel::new();

/// Raised by the supervisor when the shifter goes silent
pub static LINK_LOST: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Current backlight level (0..=254), set at boot and by serial command
pub static BACKLIGHT_LEVEL: AtomicU8 = AtomicU8::new(BacklightLevel::MAX.get());
