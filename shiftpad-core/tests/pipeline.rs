//! End-to-end pipeline: received frames through the state machine into the
//! emitters, the button controller and the gamepad report.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use shiftpad_core::buttons::ButtonController;
use shiftpad_core::emitter::GearDisplayEmitter;
use shiftpad_core::gamepad::SharedGamepad;
use shiftpad_core::link::{LinkEvent, LinkMonitor};
use shiftpad_core::shared::{SharedVehicleState, StateWriter};
use shiftpad_protocol::{
    can_ids, encode_json, ButtonAction, CanFrame, Command, Gear, HidButton, LeverPosition,
    LeverPositionMsg, ParkButton, ShifterMessage,
};

/// What the receive task does with one frame
fn receive(writer: &mut StateWriter<'_, NoopRawMutex>, frame: &CanFrame, now_ms: u64) {
    match ShifterMessage::from_frame(frame).unwrap() {
        ShifterMessage::LeverPosition(msg) => {
            writer.apply_lever(msg.lever, msg.park, now_ms);
        }
        ShifterMessage::Heartbeat => writer.touch(now_ms),
        ShifterMessage::Other(_) => {}
    }
}

fn lever_frame(lever: LeverPosition, park: ParkButton) -> CanFrame {
    LeverPositionMsg { lever, park }.to_frame().unwrap()
}

/// Run the HID task from `from_ms` to `to_ms` in 10 ms ticks
fn run_hid(
    controller: &mut ButtonController,
    shared: &SharedVehicleState<NoopRawMutex>,
    gamepad: &SharedGamepad<NoopRawMutex>,
    from_ms: u64,
    to_ms: u64,
) {
    let mut sink = gamepad.sink();
    for now in (from_ms..to_ms).step_by(10) {
        controller.update(&shared.snapshot(), now, &mut sink).unwrap();
    }
}

#[test]
fn test_drive_and_manual_shift() {
    let shared = SharedVehicleState::<NoopRawMutex>::new();
    let gamepad = SharedGamepad::<NoopRawMutex>::new();
    gamepad.set_ready(true);
    let mut writer = shared.writer().unwrap();
    let mut controller = ButtonController::default();
    let mut display = GearDisplayEmitter::new(false);

    // Park → Drive
    receive(&mut writer, &lever_frame(LeverPosition::Down1, ParkButton::Normal), 0);
    run_hid(&mut controller, &shared, &gamepad, 0, 10);
    assert!(gamepad.report().is_pressed(HidButton::Drive));

    let frame = display.next_frame(&shared.snapshot()).unwrap();
    assert_eq!(frame.id, can_ids::GEAR_DISPLAY);
    assert_eq!(frame.data()[2], 0x81);

    run_hid(&mut controller, &shared, &gamepad, 10, 100);
    assert!(!gamepad.report().is_pressed(HidButton::Drive));

    // Drive → Manual, then one downshift request
    receive(&mut writer, &lever_frame(LeverPosition::Center, ParkButton::Normal), 100);
    receive(&mut writer, &lever_frame(LeverPosition::CenterSide, ParkButton::Normal), 200);
    run_hid(&mut controller, &shared, &gamepad, 200, 210);
    assert_eq!(shared.snapshot().vehicle.current_gear(), Gear::M);
    assert_eq!(gamepad.report().buttons, 0);

    receive(&mut writer, &lever_frame(LeverPosition::SideDown, ParkButton::Normal), 300);
    run_hid(&mut controller, &shared, &gamepad, 300, 310);
    assert!(gamepad.report().is_pressed(HidButton::Minus));
    assert_eq!(shared.snapshot().vehicle.manual_gear(), 1);

    run_hid(&mut controller, &shared, &gamepad, 310, 400);
    assert_eq!(gamepad.report().buttons, 0);
}

#[test]
fn test_disconnect_releases_and_reconnect_refreshes() {
    let shared = SharedVehicleState::<NoopRawMutex>::new();
    let gamepad = SharedGamepad::<NoopRawMutex>::new();
    gamepad.set_ready(true);
    let mut writer = shared.writer().unwrap();
    let mut controller = ButtonController::default();
    let mut monitor = LinkMonitor::default();

    receive(&mut writer, &lever_frame(LeverPosition::Up1, ParkButton::Normal), 0);
    receive(&mut writer, &lever_frame(LeverPosition::Up2, ParkButton::Normal), 50);
    run_hid(&mut controller, &shared, &gamepad, 50, 1000);
    assert_eq!(shared.snapshot().vehicle.current_gear(), Gear::R);
    assert_eq!(gamepad.report().buttons, HidButton::Reverse.mask());

    assert_eq!(
        monitor.check(1000, shared.snapshot().last_seen_ms),
        Some(LinkEvent::Restored)
    );
    assert_eq!(monitor.check(2000, shared.snapshot().last_seen_ms), None);

    // Shifter goes quiet
    let event = monitor.check(3000, shared.snapshot().last_seen_ms);
    assert_eq!(event, Some(LinkEvent::Lost));
    controller.release_all(&shared.snapshot(), &mut gamepad.sink());
    assert_eq!(gamepad.report().buttons, 0);

    // Nothing new arrives: the HID task stays quiet
    run_hid(&mut controller, &shared, &gamepad, 3000, 3500);
    assert_eq!(gamepad.report().buttons, 0);

    // Heartbeat alone restores the link but carries no lever state
    let heartbeat = CanFrame::new(can_ids::HEARTBEAT, &[0; 8]).unwrap();
    receive(&mut writer, &heartbeat, 3600);
    assert_eq!(
        monitor.check(4000, shared.snapshot().last_seen_ms),
        Some(LinkEvent::Restored)
    );
    run_hid(&mut controller, &shared, &gamepad, 4000, 4100);
    assert_eq!(gamepad.report().buttons, 0);

    // First lever frame after reconnect re-applies the held gear
    receive(&mut writer, &lever_frame(LeverPosition::Center, ParkButton::Normal), 4100);
    run_hid(&mut controller, &shared, &gamepad, 4100, 4200);
    assert_eq!(gamepad.report().buttons, HidButton::Reverse.mask());
}

#[test]
fn test_disconnect_while_host_away_releases_reverse() {
    let shared = SharedVehicleState::<NoopRawMutex>::new();
    let gamepad = SharedGamepad::<NoopRawMutex>::new();
    gamepad.set_ready(true);
    let mut writer = shared.writer().unwrap();
    let mut controller = ButtonController::default();

    // P → N → R, R held
    receive(&mut writer, &lever_frame(LeverPosition::Up1, ParkButton::Normal), 0);
    receive(&mut writer, &lever_frame(LeverPosition::Up2, ParkButton::Normal), 50);
    run_hid(&mut controller, &shared, &gamepad, 50, 200);
    assert_eq!(gamepad.report().buttons, HidButton::Reverse.mask());

    // Host goes away, then the shifter does
    gamepad.set_ready(false);
    controller.release_all(&shared.snapshot(), &mut gamepad.sink());
    assert_eq!(gamepad.report().buttons, 0);

    // Host comes back before the shifter: nothing is held
    gamepad.set_ready(true);
    assert_eq!(gamepad.report().buttons, 0);

    // Shifter returns and moves R → N
    receive(&mut writer, &lever_frame(LeverPosition::Center, ParkButton::Normal), 3000);
    receive(&mut writer, &lever_frame(LeverPosition::Down1, ParkButton::Normal), 3050);
    assert_eq!(shared.snapshot().vehicle.current_gear(), Gear::N);
    run_hid(&mut controller, &shared, &gamepad, 3050, 3060);
    assert_eq!(gamepad.report().buttons, HidButton::Neutral.mask());

    run_hid(&mut controller, &shared, &gamepad, 3060, 4000);
    assert!(!gamepad.report().is_pressed(HidButton::Reverse));
    assert_eq!(gamepad.report().buttons, 0);
}

#[test]
fn test_park_overrides_everything() {
    let shared = SharedVehicleState::<NoopRawMutex>::new();
    let mut writer = shared.writer().unwrap();

    receive(&mut writer, &lever_frame(LeverPosition::Down1, ParkButton::Normal), 0);
    receive(&mut writer, &lever_frame(LeverPosition::Down2, ParkButton::Pressed), 10);
    assert_eq!(shared.snapshot().vehicle.current_gear(), Gear::P);
}

#[test]
fn test_command_channel_shares_report() {
    let shared = SharedVehicleState::<NoopRawMutex>::new();
    let gamepad = SharedGamepad::<NoopRawMutex>::new();
    gamepad.set_ready(true);
    let mut writer = shared.writer().unwrap();
    let mut controller = ButtonController::default();

    match Command::parse(r#"{"type":"hid_button","button":"U","action":"press"}"#).unwrap() {
        Command::Button { button, action } => {
            gamepad.apply(button, action).unwrap();
        }
        other => panic!("unexpected command {:?}", other),
    }

    receive(&mut writer, &lever_frame(LeverPosition::Up1, ParkButton::Normal), 0);
    run_hid(&mut controller, &shared, &gamepad, 0, 10);

    let report = gamepad.report();
    assert!(report.is_pressed(HidButton::Unlock));
    assert!(report.is_pressed(HidButton::Neutral));

    gamepad
        .apply(HidButton::Unlock, ButtonAction::Release)
        .unwrap();
    run_hid(&mut controller, &shared, &gamepad, 10, 100);
    assert_eq!(gamepad.report().buttons, 0);
}

#[test]
fn test_gear_indication_override_reaches_display_only() {
    let shared = SharedVehicleState::<NoopRawMutex>::new();
    let gamepad = SharedGamepad::<NoopRawMutex>::new();
    gamepad.set_ready(true);
    let mut writer = shared.writer().unwrap();
    let mut controller = ButtonController::default();
    let mut display = GearDisplayEmitter::new(false);

    receive(&mut writer, &lever_frame(LeverPosition::Center, ParkButton::Normal), 0);
    if let Command::SetGearIndication(gear) =
        Command::parse(r#"{"type":"set_gear_indication","gear":"R"}"#).unwrap()
    {
        shared.set_indication_override(gear);
    }

    assert_eq!(display.next_frame(&shared.snapshot()).unwrap().data()[2], 0x40);
    run_hid(&mut controller, &shared, &gamepad, 0, 100);
    assert_eq!(gamepad.report().buttons, 0);

    // Next real gear change wins
    receive(&mut writer, &lever_frame(LeverPosition::Up1, ParkButton::Normal), 100);
    assert_eq!(display.next_frame(&shared.snapshot()).unwrap().data()[2], 0x60);
}

#[test]
fn test_state_telemetry_line() {
    let shared = SharedVehicleState::<NoopRawMutex>::new();
    let mut writer = shared.writer().unwrap();
    receive(&mut writer, &lever_frame(LeverPosition::Up1, ParkButton::Normal), 0);

    let mut buf = [0u8; 128];
    let len = encode_json(&shared.snapshot().state_report(), &mut buf).unwrap();
    assert_eq!(
        &buf[..len],
        b"{\"type\":\"shifter_state\",\"gear\":\"N\",\"lever_pos\":30,\"park\":false,\"manual\":0}\n"
    );
}
