//! CAN transmit task
//!
//! Drains the outbound queue filled by the emitter tasks.

use defmt::*;
use embassy_stm32::can::CanTx;
use embassy_time::{with_timeout, Duration};

use crate::can;
use crate::channels::CAN_TX;

/// Longest wait for a free transmit mailbox
///
/// With no other node acknowledging, frames never leave the mailboxes.
const TX_TIMEOUT: Duration = Duration::from_millis(50);

/// CAN TX task - sends queued frames
#[embassy_executor::task]
pub async fn can_tx_task(mut tx: CanTx<'static>) {
    info!("CAN TX task started");

    loop {
        let frame = CAN_TX.receive().await;

        let bus_frame = match can::to_bus(&frame) {
            Ok(bus_frame) => bus_frame,
            Err(e) => {
                warn!("Cannot send {:?}: {:?}", frame, e);
                continue;
            }
        };

        if with_timeout(TX_TIMEOUT, tx.write(&bus_frame)).await.is_err() {
            warn!("CAN TX timeout, dropping {:?}", frame);
        } else {
            trace!("TX {:?}", frame);
        }
    }
}
