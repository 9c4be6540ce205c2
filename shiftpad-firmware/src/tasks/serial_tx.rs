//! Serial telemetry transmit task

use defmt::*;
use embassy_stm32::usart::BufferedUartTx;
use embedded_io_async::Write;

use shiftpad_protocol::{encode_json, CanRxReport, TelemetryError};

use crate::channels::{Telemetry, TELEMETRY};

/// Longest telemetry line, newline included
const LINE_BUF_SIZE: usize = 128;

/// Serial TX task - writes one JSON line per report
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx<'static>) {
    info!("Serial TX task started");

    let mut buf = [0u8; LINE_BUF_SIZE];

    loop {
        let telemetry = TELEMETRY.receive().await;

        let len = match encode(&telemetry, &mut buf) {
            Ok(len) => len,
            Err(e) => {
                warn!("Failed to encode telemetry: {:?}", e);
                continue;
            }
        };

        if let Err(e) = tx.write_all(&buf[..len]).await {
            warn!("UART write error: {:?}", e);
        }
    }
}

fn encode(telemetry: &Telemetry, buf: &mut [u8]) -> Result<usize, TelemetryError> {
    match telemetry {
        Telemetry::State(report) => encode_json(report, buf),
        Telemetry::CanRx(frame) => encode_json(&CanRxReport::new(frame), buf),
    }
}
