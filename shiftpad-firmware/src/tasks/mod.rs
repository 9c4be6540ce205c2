//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod can_rx;
pub mod can_tx;
pub mod emitters;
pub mod hid;
pub mod serial_rx;
pub mod serial_tx;
pub mod supervisor;
pub mod usb;

pub use can_rx::can_rx_task;
pub use can_tx::can_tx_task;
pub use emitters::{backlight_task, gear_display_task, heartbeat_task};
pub use hid::hid_task;
pub use serial_rx::serial_rx_task;
pub use serial_tx::serial_tx_task;
pub use supervisor::supervisor_task;
pub use usb::{hid_writer_task, usb_task, UsbDriver, UsbStateHandler, HID_PACKET_SIZE};
