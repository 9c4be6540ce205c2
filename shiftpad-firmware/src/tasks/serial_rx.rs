//! Serial command receive task
//!
//! Reads newline-terminated JSON commands from the host.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_stm32::usart::BufferedUartRx;
use embedded_io_async::Read;

use shiftpad_protocol::{Command, CommandReader};

use crate::channels::{BACKLIGHT_LEVEL, GAMEPAD, VEHICLE};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial RX task - parses and applies host commands
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx<'static>) {
    info!("Serial RX task started");

    let mut reader = CommandReader::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    match reader.feed(byte) {
                        Some(Ok(cmd)) => handle_command(cmd),
                        Some(Err(e)) => warn!("Rejected command: {:?}", e),
                        None => {
                            // Need more bytes
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
                reader.reset();
            }
        }
    }
}

fn handle_command(cmd: Command) {
    match cmd {
        Command::SetBacklight(level) => {
            info!("Backlight level {}", level.get());
            BACKLIGHT_LEVEL.store(level.get(), Ordering::Relaxed);
        }
        Command::SetGearIndication(gear) => {
            info!("Gear indication override {:?}", gear);
            VEHICLE.set_indication_override(gear);
        }
        Command::Button { button, action } => match GAMEPAD.apply(button, action) {
            Ok(report) => debug!("{:?} {:?} -> {:?}", button, action, report),
            Err(e) => warn!("Cannot {:?} {:?}: {:?}", action, button, e),
        },
    }
}
