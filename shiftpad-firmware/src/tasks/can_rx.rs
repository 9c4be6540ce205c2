//! CAN receive task
//!
//! Sole writer of the vehicle state. Lever frames drive the gear state
//! machine; heartbeats only refresh liveness. Lever frames are echoed on
//! the serial port as they arrive, other frames and state reports are
//! rate limited.

use defmt::*;
use embassy_stm32::can::CanRx;
use embassy_time::Instant;

use shiftpad_core::config::SerialConfig;
use shiftpad_core::throttle::Throttle;
use shiftpad_protocol::{CanFrame, ShifterMessage};

use crate::can;
use crate::channels::{Telemetry, TELEMETRY, VEHICLE};

/// CAN RX task - decodes shifter frames into vehicle state
#[embassy_executor::task]
pub async fn can_rx_task(mut rx: CanRx<'static>, serial: SerialConfig) {
    info!("CAN RX task started");

    let Some(mut writer) = VEHICLE.writer() else {
        error!("Vehicle state already has a writer, CAN RX task exiting");
        return;
    };

    let mut state_reports = Throttle::new(serial.report_interval_ms);
    let mut frame_reports = Throttle::new(serial.can_log_interval_ms);

    loop {
        let envelope = match rx.read().await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("CAN bus error: {:?}", e);
                continue;
            }
        };

        let Some(frame) = can::from_bus(&envelope.frame) else {
            trace!("Dropping extended-id frame");
            continue;
        };
        let now = Instant::now().as_millis();

        match ShifterMessage::from_frame(&frame) {
            Ok(ShifterMessage::LeverPosition(msg)) => {
                report(Telemetry::CanRx(frame));
                let (rule, snapshot) = writer.apply_lever(msg.lever, msg.park, now);
                if rule.changes_gear() {
                    info!(
                        "Gear {:?} ({:?}, lever {:?})",
                        snapshot.vehicle.current_gear(),
                        rule,
                        msg.lever
                    );
                }
                if state_reports.allow(now) {
                    report(Telemetry::State(snapshot.state_report()));
                }
            }
            Ok(ShifterMessage::Heartbeat) => {
                writer.touch(now);
                log_frame(&mut frame_reports, frame, now);
            }
            Ok(ShifterMessage::Other(_)) => log_frame(&mut frame_reports, frame, now),
            Err(e) => warn!("Malformed shifter frame {:?}: {:?}", frame, e),
        }
    }
}

fn log_frame(throttle: &mut Throttle, frame: CanFrame, now: u64) {
    if throttle.allow(now) {
        report(Telemetry::CanRx(frame));
    }
}

fn report(telemetry: Telemetry) {
    if TELEMETRY.try_send(telemetry).is_err() {
        trace!("Telemetry queue full, dropping report");
    }
}
