//! Periodic display and heartbeat frames
//!
//! One task per frame type, each with its own period and its own codec.
//! Frames go to the CAN TX queue; a full queue drops the frame, since the
//! next period sends fresh content anyway.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_time::{Duration, Ticker};

use shiftpad_core::emitter::{BacklightEmitter, GearDisplayEmitter, HeartbeatEmitter};
use shiftpad_protocol::{BacklightLevel, CanFrame, FrameError};

use crate::channels::{BACKLIGHT_LEVEL, CAN_TX, VEHICLE};

/// Gear display task - mirrors the current gear on the lever
#[embassy_executor::task]
pub async fn gear_display_task(period_ms: u64, flash: bool) {
    info!("Gear display task started ({} ms)", period_ms);

    let mut emitter = GearDisplayEmitter::new(flash);
    let mut ticker = Ticker::every(Duration::from_millis(period_ms));

    loop {
        queue(emitter.next_frame(&VEHICLE.snapshot()));
        ticker.next().await;
    }
}

/// Backlight task - keeps the lever illuminated
#[embassy_executor::task]
pub async fn backlight_task(period_ms: u64, stamp_counter: bool) {
    info!("Backlight task started ({} ms)", period_ms);

    let mut emitter = BacklightEmitter::new(stamp_counter);
    let mut ticker = Ticker::every(Duration::from_millis(period_ms));

    loop {
        let level = BacklightLevel::new(BACKLIGHT_LEVEL.load(Ordering::Relaxed) as u16)
            .unwrap_or_default();
        queue(emitter.next_frame(level));
        ticker.next().await;
    }
}

/// Heartbeat task - announces this node on the bus
#[embassy_executor::task]
pub async fn heartbeat_task(period_ms: u64, bus_id: u8) {
    info!("Heartbeat task started ({} ms, bus 0x{:02x})", period_ms, bus_id);

    let mut emitter = HeartbeatEmitter::new(bus_id);
    let mut ticker = Ticker::every(Duration::from_millis(period_ms));

    loop {
        queue(emitter.next_frame());
        ticker.next().await;
    }
}

fn queue(frame: Result<CanFrame, FrameError>) {
    match frame {
        Ok(frame) => {
            if CAN_TX.try_send(frame).is_err() {
                warn!("CAN TX queue full, dropping frame");
            }
        }
        Err(e) => error!("Failed to build frame: {:?}", e),
    }
}
