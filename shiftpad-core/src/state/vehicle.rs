//! Vehicle state record

use shiftpad_protocol::{Gear, GearIndication, LeverPosition, ParkButton};

use super::machine::{classify, shift_down, shift_up, Rule, TransitionKey};

/// Gear lever and gear state
///
/// Fields are read through accessors; the only way to change a live state
/// is [`VehicleState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VehicleState {
    lever_position: LeverPosition,
    park_button: ParkButton,
    current_gear: Gear,
    /// Meaningful only while in M; kept when leaving M
    manual_gear: u16,
    /// Last distinct lever position, for edge detection
    prev_lever_position: LeverPosition,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleState {
    /// Power-on state: lever centered, park released, gear P
    pub const fn new() -> Self {
        Self {
            lever_position: LeverPosition::Center,
            park_button: ParkButton::Normal,
            current_gear: Gear::P,
            manual_gear: 0,
            prev_lever_position: LeverPosition::Center,
        }
    }

    /// Rebuild a state from its parts (simulation and tests)
    pub const fn from_parts(
        current_gear: Gear,
        lever_position: LeverPosition,
        prev_lever_position: LeverPosition,
        manual_gear: u16,
    ) -> Self {
        Self {
            lever_position,
            park_button: ParkButton::Normal,
            current_gear,
            manual_gear,
            prev_lever_position,
        }
    }

    pub fn lever_position(&self) -> LeverPosition {
        self.lever_position
    }

    pub fn park_button(&self) -> ParkButton {
        self.park_button
    }

    pub fn current_gear(&self) -> Gear {
        self.current_gear
    }

    pub fn manual_gear(&self) -> u16 {
        self.manual_gear
    }

    pub fn prev_lever_position(&self) -> LeverPosition {
        self.prev_lever_position
    }

    /// Indication derived from the gear, with M split by lever position
    pub fn indication(&self) -> GearIndication {
        match self.current_gear {
            Gear::M if self.lever_position == LeverPosition::CenterSide => {
                GearIndication::ManualSide
            }
            gear => GearIndication::from_gear(gear),
        }
    }

    /// Feed a newly observed lever reading through the state machine
    ///
    /// Returns the rule that fired.
    pub fn apply(&mut self, lever: LeverPosition, park: ParkButton) -> Rule {
        let key = TransitionKey {
            gear: self.current_gear,
            lever,
            prev: self.prev_lever_position,
            park,
        };
        let rule = classify(&key);

        match rule {
            Rule::ParkPressed => self.current_gear = Gear::P,
            Rule::LeverUp => self.current_gear = shift_up(self.current_gear),
            Rule::LeverDown => self.current_gear = shift_down(self.current_gear),
            Rule::EnterManual => self.current_gear = Gear::M,
            Rule::LeaveManual => self.current_gear = Gear::D,
            Rule::ManualShift => match lever {
                LeverPosition::SideUp => self.manual_gear = self.manual_gear.saturating_sub(1),
                LeverPosition::SideDown => self.manual_gear = self.manual_gear.saturating_add(1),
                _ => {}
            },
            Rule::ReturnToCenter | Rule::NoMatch => {}
        }

        self.lever_position = lever;
        self.park_button = park;
        // A repeated reading equals prev already, so "held" positions
        // never produce a second edge.
        if lever != self.prev_lever_position {
            self.prev_lever_position = lever;
        }

        rule
    }
}
