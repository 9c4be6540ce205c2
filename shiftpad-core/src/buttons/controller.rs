//! Button emulation controller
//!
//! Two independent outputs share the gamepad:
//!
//! - **Gear output** follows the derived gear indication. N and D pulse
//!   their button, R holds its button for as long as the indication stays
//!   R, P and both M indications press nothing.
//! - **Shift output** follows the lever while in M. SideUp pulses Plus,
//!   SideDown pulses Minus, anything else presses nothing.
//!
//! Each output reacts only when its input changes. Pulses are released by
//! [`ButtonController::service`], which the HID task calls every tick.

use shiftpad_protocol::{ButtonAction, Gear, GearIndication, HidButton, LeverPosition};

use super::timer::ButtonTimer;
use crate::shared::VehicleSnapshot;
use crate::state::VehicleState;
use crate::traits::{HidError, HidSink};

/// Length of a timed press
pub const DEFAULT_PULSE_MS: u64 = 80;

/// Inputs of the shift output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShiftInput {
    lever: LeverPosition,
    manual: bool,
}

impl ShiftInput {
    fn of(vehicle: &VehicleState) -> Self {
        Self {
            lever: vehicle.lever_position(),
            manual: vehicle.current_gear() == Gear::M,
        }
    }

    fn button(&self) -> Option<HidButton> {
        if !self.manual {
            return None;
        }
        match self.lever {
            LeverPosition::SideUp => Some(HidButton::Plus),
            LeverPosition::SideDown => Some(HidButton::Minus),
            _ => None,
        }
    }
}

/// What the gear output should do for an indication
fn gear_press(indication: GearIndication) -> Option<(HidButton, bool)> {
    match indication {
        GearIndication::Reverse => Some((HidButton::Reverse, true)),
        GearIndication::Neutral => Some((HidButton::Neutral, false)),
        GearIndication::Drive => Some((HidButton::Drive, false)),
        GearIndication::Park | GearIndication::Manual | GearIndication::ManualSide => None,
    }
}

/// Drives gear and shift buttons from vehicle snapshots
#[derive(Debug, Clone)]
pub struct ButtonController {
    gear: ButtonTimer,
    shift: ButtonTimer,
    /// Indication the gear output last acted on
    last_indication: Option<GearIndication>,
    /// Lever and mode the shift output last acted on
    last_shift: Option<ShiftInput>,
    /// Lever frame count at boot or at the last reset
    frames_at_reset: u32,
    pulse_ms: u64,
}

impl Default for ButtonController {
    fn default() -> Self {
        Self::new(DEFAULT_PULSE_MS)
    }
}

impl ButtonController {
    pub fn new(pulse_ms: u64) -> Self {
        Self {
            gear: ButtonTimer::Idle,
            shift: ButtonTimer::Idle,
            last_indication: None,
            last_shift: None,
            frames_at_reset: 0,
            pulse_ms,
        }
    }

    pub fn gear_output(&self) -> ButtonTimer {
        self.gear
    }

    pub fn shift_output(&self) -> ButtonTimer {
        self.shift
    }

    /// True once a lever frame has arrived since boot or the last reset
    pub fn is_active(&self, snapshot: &VehicleSnapshot) -> bool {
        snapshot.lever_frames != self.frames_at_reset
    }

    /// One maintenance tick
    ///
    /// Releases expired pulses, then re-evaluates both outputs. Does nothing
    /// until the first lever frame after boot or a reset.
    pub fn update<S: HidSink>(
        &mut self,
        snapshot: &VehicleSnapshot,
        now_ms: u64,
        sink: &mut S,
    ) -> Result<(), HidError> {
        if !sink.is_ready() {
            return Err(HidError::NotReady);
        }
        if !self.is_active(snapshot) {
            return Ok(());
        }

        self.service(now_ms, sink)?;
        self.update_gear(snapshot.vehicle.indication(), now_ms, sink)?;
        self.update_shift(ShiftInput::of(&snapshot.vehicle), now_ms, sink)
    }

    /// Release every pulse whose deadline has passed
    pub fn service<S: HidSink>(&mut self, now_ms: u64, sink: &mut S) -> Result<(), HidError> {
        for slot in [&mut self.gear, &mut self.shift] {
            if slot.is_due(now_ms) {
                if let Some(button) = slot.pressed() {
                    sink.send_button(button, ButtonAction::Release)?;
                }
                *slot = ButtonTimer::Idle;
            }
        }
        Ok(())
    }

    /// Force every gear and shift button up and forget all press state
    ///
    /// Each of the seven buttons gets exactly one release, whatever the
    /// timers say, and the release sticks even while the host is away. The
    /// controller then waits for a new lever frame and treats the state it
    /// carries as fresh.
    pub fn release_all<S: HidSink>(&mut self, snapshot: &VehicleSnapshot, sink: &mut S) {
        self.gear = ButtonTimer::Idle;
        self.shift = ButtonTimer::Idle;
        self.last_indication = None;
        self.last_shift = None;
        self.frames_at_reset = snapshot.lever_frames;

        sink.force_release(&HidButton::GEAR_AND_SHIFT);
    }

    fn update_gear<S: HidSink>(
        &mut self,
        indication: GearIndication,
        now_ms: u64,
        sink: &mut S,
    ) -> Result<(), HidError> {
        if self.last_indication == Some(indication) {
            return Ok(());
        }

        let wanted = gear_press(indication);

        // R already held for R: nothing to redo
        if let Some((button, true)) = wanted {
            if self.gear.is_held(button) {
                self.last_indication = Some(indication);
                return Ok(());
            }
        }

        if let Some(button) = self.gear.pressed() {
            sink.send_button(button, ButtonAction::Release)?;
            self.gear = ButtonTimer::Idle;
        }

        if let Some((button, hold)) = wanted {
            sink.send_button(button, ButtonAction::Press)?;
            self.gear = if hold {
                ButtonTimer::Held { button }
            } else {
                ButtonTimer::pulse(button, now_ms, self.pulse_ms)
            };
        }

        self.last_indication = Some(indication);
        Ok(())
    }

    fn update_shift<S: HidSink>(
        &mut self,
        input: ShiftInput,
        now_ms: u64,
        sink: &mut S,
    ) -> Result<(), HidError> {
        if self.last_shift == Some(input) {
            return Ok(());
        }

        if let Some(button) = self.shift.pressed() {
            sink.send_button(button, ButtonAction::Release)?;
            self.shift = ButtonTimer::Idle;
        }

        if let Some(button) = input.button() {
            sink.send_button(button, ButtonAction::Press)?;
            self.shift = ButtonTimer::pulse(button, now_ms, self.pulse_ms);
        }

        self.last_shift = Some(input);
        Ok(())
    }
}
