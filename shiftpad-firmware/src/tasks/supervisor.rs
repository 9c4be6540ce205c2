//! Link supervision task

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use shiftpad_core::link::{LinkEvent, LinkMonitor};

use crate::channels::{LINK_LOST, VEHICLE};

/// Supervisor task - watches for shifter silence
#[embassy_executor::task]
pub async fn supervisor_task(period_ms: u64, timeout_ms: u64) {
    info!("Supervisor task started (timeout {} ms)", timeout_ms);

    let mut monitor = LinkMonitor::new(timeout_ms);
    let mut ticker = Ticker::every(Duration::from_millis(period_ms));

    loop {
        ticker.next().await;

        let now = Instant::now().as_millis();
        match monitor.check(now, VEHICLE.snapshot().last_seen_ms) {
            Some(LinkEvent::Lost) => {
                warn!("Shifter silent for more than {} ms", timeout_ms);
                LINK_LOST.signal(());
            }
            Some(LinkEvent::Restored) => info!("Shifter link up"),
            None => {}
        }
    }
}
