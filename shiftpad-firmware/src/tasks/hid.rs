//! Button emulation task
//!
//! Turns vehicle state into gamepad presses on a fixed tick, and drops
//! every press the moment the supervisor reports the shifter gone.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Ticker};

use shiftpad_core::buttons::ButtonController;
use shiftpad_core::traits::HidError;

use crate::channels::{GAMEPAD, LINK_LOST, VEHICLE};

/// HID task - drives gear and shift buttons
#[embassy_executor::task]
pub async fn hid_task(tick_ms: u64, pulse_ms: u64) {
    info!("HID task started (tick {} ms, pulse {} ms)", tick_ms, pulse_ms);

    let mut controller = ButtonController::new(pulse_ms);
    let mut sink = GAMEPAD.sink();
    let mut ticker = Ticker::every(Duration::from_millis(tick_ms));
    let mut host_ready = false;

    loop {
        match select(ticker.next(), LINK_LOST.wait()).await {
            Either::First(()) => {
                let now = Instant::now().as_millis();
                match controller.update(&VEHICLE.snapshot(), now, &mut sink) {
                    Ok(()) => {
                        if !host_ready {
                            info!("USB host ready, driving buttons");
                            host_ready = true;
                        }
                    }
                    Err(HidError::NotReady) => {
                        if host_ready {
                            info!("USB host gone, holding button state");
                            host_ready = false;
                        }
                    }
                }
            }
            Either::Second(()) => {
                info!("Shifter link lost, releasing all buttons");
                // Sticks even with the host away; it gets the cleared
                // report once it is ready again
                controller.release_all(&VEHICLE.snapshot(), &mut sink);
            }
        }
    }
}
