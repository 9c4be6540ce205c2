//! USB device and gamepad report tasks

use defmt::*;
use embassy_stm32::peripherals::USB;
use embassy_stm32::usb::Driver;
use embassy_usb::class::hid::HidWriter;
use embassy_usb::{Handler, UsbDevice};

use shiftpad_protocol::{REPORT_ID, REPORT_SIZE};

use crate::channels::GAMEPAD;

pub type UsbDriver = Driver<'static, USB>;

/// Report ID byte plus report body
pub const HID_PACKET_SIZE: usize = REPORT_SIZE + 1;

/// Tracks whether the host can take reports
///
/// Ready means configured and not suspended. Every change is pushed into
/// the shared gamepad, which republishes the current report on the rising
/// edge.
pub struct UsbStateHandler {
    configured: bool,
    suspended: bool,
}

impl UsbStateHandler {
    pub const fn new() -> Self {
        Self {
            configured: false,
            suspended: false,
        }
    }

    fn publish(&self) {
        GAMEPAD.set_ready(self.configured && !self.suspended);
    }
}

impl Handler for UsbStateHandler {
    fn reset(&mut self) {
        self.configured = false;
        self.publish();
    }

    fn configured(&mut self, configured: bool) {
        info!("USB configured: {}", configured);
        self.configured = configured;
        self.publish();
    }

    fn suspended(&mut self, suspended: bool) {
        info!("USB suspended: {}", suspended);
        self.suspended = suspended;
        self.publish();
    }
}

/// USB task - runs the device stack
#[embassy_executor::task]
pub async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB task started");
    usb.run().await
}

/// HID writer task - sends the gamepad report whenever it changes
#[embassy_executor::task]
pub async fn hid_writer_task(mut writer: HidWriter<'static, UsbDriver, HID_PACKET_SIZE>) {
    info!("HID writer task started");

    let mut packet = [0u8; HID_PACKET_SIZE];
    packet[0] = REPORT_ID;

    loop {
        let report = GAMEPAD.wait_changed().await;
        packet[1..].copy_from_slice(&report.encode());

        match writer.write(&packet).await {
            Ok(()) => trace!("HID report {:?}", report),
            Err(e) => warn!("HID write failed: {:?}", e),
        }
    }
}
