//! Shiftpad - CAN Gear Shifter to USB Gamepad Firmware
//!
//! Main firmware binary for STM32F072 boards. Listens to an automotive
//! shift lever on the CAN bus, keeps the gear state machine, feeds the
//! lever's gear display and backlight, and presents the gear to a PC as
//! an 8-button USB HID gamepad. A UART carries JSON telemetry out and
//! JSON commands in.
//!
//! Pinout:
//! - CAN: PB8 (RX), PB9 (TX)
//! - USB: PA11 (DM), PA12 (DP)
//! - UART: PA2 (TX), PA3 (RX)

#![no_std]
#![no_main]

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::can::filter::Mask32;
use embassy_stm32::can::{
    Can, CanRx, CanTx, Fifo, Rx0InterruptHandler, Rx1InterruptHandler, SceInterruptHandler,
    TxInterruptHandler,
};
use embassy_stm32::peripherals::{CAN, PA11, PA12, USART2, USB};
use embassy_stm32::usart::{self, BufferedUart};
use embassy_stm32::{usb, Peri};
use embassy_time::Timer;
use embassy_usb::class::hid::{self, HidBootProtocol, HidSubclass, HidWriter};
use embassy_usb::Builder;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use shiftpad_core::config::ShifterConfig;
use shiftpad_protocol::REPORT_DESCRIPTOR;

use crate::channels::BACKLIGHT_LEVEL;
use crate::config::load_config;
use crate::tasks::{UsbDriver, UsbStateHandler, HID_PACKET_SIZE};

mod can;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    CEC_CAN => Rx0InterruptHandler<CAN>, Rx1InterruptHandler<CAN>, SceInterruptHandler<CAN>, TxInterruptHandler<CAN>;
    USB => usb::InterruptHandler<USB>;
    USART2 => usart::BufferedInterruptHandler<USART2>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// USB descriptor and control buffers
static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static HID_STATE: StaticCell<hid::State> = StaticCell::new();
static USB_HANDLER: StaticCell<UsbStateHandler> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Shiftpad firmware starting...");

    // HSI48 trimmed from USB SOF packets clocks both the core and USB
    let mut stm_config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::*;
        stm_config.rcc.hsi48 = Some(Hsi48Config {
            sync_from_usb: true,
        });
        stm_config.rcc.sys = Sysclk::HSI48;
    }
    let p = embassy_stm32::init(stm_config);
    info!("Peripherals initialized");

    let config = load_config();
    BACKLIGHT_LEVEL.store(config.display.backlight_level().get(), Ordering::Relaxed);
    info!("Configuration loaded: {:?}", config);

    // Setup CAN, accepting every standard frame
    let mut can = Can::new(p.CAN, p.PB8, p.PB9, Irqs);
    can.modify_filters()
        .enable_bank(0, Fifo::Fifo0, Mask32::accept_all());
    can.modify_config()
        .set_loopback(false)
        .set_silent(false)
        .set_automatic_retransmit(true);
    can.set_bitrate(config.can.bitrate);
    can.enable().await;
    let (can_tx, can_rx) = can.split();

    info!("CAN initialized at {} bit/s", config.can.bitrate);

    // Setup UART for the host command channel
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = config.serial.baud;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    spawn_bus_tasks(&spawner, &config, can_tx, can_rx);
    spawn_usb(&spawner, p.USB, p.PA12, p.PA11);

    match BufferedUart::new(p.USART2, p.PA3, p.PA2, tx_buf, rx_buf, Irqs, uart_config) {
        Ok(uart) => {
            let (uart_tx, uart_rx) = uart.split();
            info!("UART initialized at {} baud", config.serial.baud);
            spawner.spawn(tasks::serial_rx_task(uart_rx)).unwrap();
            spawner.spawn(tasks::serial_tx_task(uart_tx)).unwrap();
        }
        Err(e) => {
            // CAN and USB keep running without the command channel
            error!("UART config rejected: {:?}", e);
        }
    }

    info!("All tasks spawned, firmware running");

    // All work happens in spawned tasks
    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Spawn the CAN side: receive, transmit, emitters, HID logic, supervision
fn spawn_bus_tasks(
    spawner: &Spawner,
    config: &ShifterConfig,
    can_tx: CanTx<'static>,
    can_rx: CanRx<'static>,
) {
    let timing = &config.timing;

    spawner
        .spawn(tasks::can_rx_task(can_rx, config.serial))
        .unwrap();
    spawner.spawn(tasks::can_tx_task(can_tx)).unwrap();
    spawner
        .spawn(tasks::gear_display_task(
            timing.gear_display_ms,
            config.display.flash_indication,
        ))
        .unwrap();
    spawner
        .spawn(tasks::backlight_task(
            timing.backlight_ms,
            config.display.stamp_backlight_counter,
        ))
        .unwrap();
    spawner
        .spawn(tasks::heartbeat_task(timing.heartbeat_ms, config.can.bus_id))
        .unwrap();
    spawner
        .spawn(tasks::hid_task(timing.hid_tick_ms, timing.pulse_ms))
        .unwrap();
    spawner
        .spawn(tasks::supervisor_task(
            timing.supervisor_ms,
            timing.link_timeout_ms,
        ))
        .unwrap();
}

/// Build the USB gamepad device and spawn its tasks
fn spawn_usb(
    spawner: &Spawner,
    usb_peri: Peri<'static, USB>,
    dp: Peri<'static, PA12>,
    dm: Peri<'static, PA11>,
) {
    let driver: UsbDriver = usb::Driver::new(usb_peri, Irqs, dp, dm);

    let mut usb_config = embassy_usb::Config::new(0x1209, 0x5a50);
    usb_config.manufacturer = Some("Shiftpad");
    usb_config.product = Some("Shiftpad Gear Shifter");
    usb_config.serial_number = Some("0001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESC.init([0; 256]),
        BOS_DESC.init([0; 256]),
        &mut [],
        CONTROL_BUF.init([0; 64]),
    );
    builder.handler(USB_HANDLER.init(UsbStateHandler::new()));

    let hid_config = hid::Config {
        report_descriptor: &REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: 10,
        max_packet_size: 64,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };
    let writer = HidWriter::<_, HID_PACKET_SIZE>::new(
        &mut builder,
        HID_STATE.init(hid::State::new()),
        hid_config,
    );
    let device = builder.build();

    info!("USB gamepad initialized");

    spawner.spawn(tasks::usb_task(device)).unwrap();
    spawner.spawn(tasks::hid_writer_task(writer)).unwrap();
}
