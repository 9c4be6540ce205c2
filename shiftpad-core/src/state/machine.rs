//! Gear lever state machine
//!
//! Transitions are decided by an ordered rule table. Each rule sees the
//! current gear, the new lever reading, the previously recorded lever
//! position and the park button; the first rule that applies wins.
//!
//! ```text
//!            Up1          Up1
//!   ┌───┐ ────────▶ ┌───┐ ────▶ ┌───┐
//!   │ P │           │ N │       │ R │
//!   └───┘ ──┐       └───┘ ◀──── └───┘
//!     Down1 │      Down1 │  Down1
//!           ▼            ▼
//!         ┌───┐  side  ┌───┐
//!         │ D │ ─────▶ │ M │  SideUp: manual - 1
//!         └───┘ ◀───── └───┘  SideDown: manual + 1
//!              center
//!
//!   Park pressed → P from anywhere
//! ```

use shiftpad_protocol::{Gear, LeverPosition, ParkButton};

/// Inputs a rule may look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransitionKey {
    pub gear: Gear,
    pub lever: LeverPosition,
    pub prev: LeverPosition,
    pub park: ParkButton,
}

/// Transition rules, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rule {
    /// Park pressed: gear becomes P
    ParkPressed,
    /// Center → Up1 or Up1 → Up2
    LeverUp,
    /// Center → Down1 or Down1 → Down2
    LeverDown,
    /// Center → CenterSide while in D
    EnterManual,
    /// CenterSide → Center while in M
    LeaveManual,
    /// Any move off CenterSide while in M
    ManualShift,
    /// Lever came back to center from elsewhere; gear unchanged
    ReturnToCenter,
    /// Nothing applies; gear unchanged
    NoMatch,
}

impl Rule {
    /// True if the rule can change the current gear
    pub fn changes_gear(self) -> bool {
        matches!(
            self,
            Rule::ParkPressed
                | Rule::LeverUp
                | Rule::LeverDown
                | Rule::EnterManual
                | Rule::LeaveManual
        )
    }
}

struct RuleEntry {
    rule: Rule,
    applies: fn(&TransitionKey) -> bool,
}

const RULES: [RuleEntry; 7] = [
    RuleEntry {
        rule: Rule::ParkPressed,
        applies: park_pressed,
    },
    RuleEntry {
        rule: Rule::LeverUp,
        applies: lever_up,
    },
    RuleEntry {
        rule: Rule::LeverDown,
        applies: lever_down,
    },
    RuleEntry {
        rule: Rule::EnterManual,
        applies: enter_manual,
    },
    RuleEntry {
        rule: Rule::LeaveManual,
        applies: leave_manual,
    },
    RuleEntry {
        rule: Rule::ManualShift,
        applies: manual_shift,
    },
    RuleEntry {
        rule: Rule::ReturnToCenter,
        applies: return_to_center,
    },
];

fn park_pressed(key: &TransitionKey) -> bool {
    key.park.is_pressed()
}

fn lever_up(key: &TransitionKey) -> bool {
    matches!(
        (key.prev, key.lever),
        (LeverPosition::Center, LeverPosition::Up1) | (LeverPosition::Up1, LeverPosition::Up2)
    )
}

fn lever_down(key: &TransitionKey) -> bool {
    matches!(
        (key.prev, key.lever),
        (LeverPosition::Center, LeverPosition::Down1)
            | (LeverPosition::Down1, LeverPosition::Down2)
    )
}

fn enter_manual(key: &TransitionKey) -> bool {
    key.prev == LeverPosition::Center
        && key.lever == LeverPosition::CenterSide
        && key.gear == Gear::D
}

fn leave_manual(key: &TransitionKey) -> bool {
    key.prev == LeverPosition::CenterSide
        && key.lever == LeverPosition::Center
        && key.gear == Gear::M
}

fn manual_shift(key: &TransitionKey) -> bool {
    key.prev == LeverPosition::CenterSide && key.gear == Gear::M
}

fn return_to_center(key: &TransitionKey) -> bool {
    key.lever == LeverPosition::Center && key.prev != LeverPosition::Center
}

/// First rule that applies to `key`
pub fn classify(key: &TransitionKey) -> Rule {
    RULES
        .iter()
        .find(|entry| (entry.applies)(key))
        .map(|entry| entry.rule)
        .unwrap_or(Rule::NoMatch)
}

/// Gear after a forward lever move
pub fn shift_up(gear: Gear) -> Gear {
    match gear {
        Gear::P | Gear::D => Gear::N,
        Gear::N => Gear::R,
        other => other,
    }
}

/// Gear after a backward lever move
pub fn shift_down(gear: Gear) -> Gear {
    match gear {
        Gear::P | Gear::N => Gear::D,
        Gear::R => Gear::N,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::VehicleState;
    use proptest::prelude::*;

    const PARKS: [ParkButton; 2] = [ParkButton::Normal, ParkButton::Pressed];

    /// Straight-line reading of the transition table, used as an oracle
    fn expected(gear: Gear, lever: LeverPosition, prev: LeverPosition, park: ParkButton) -> (Gear, i32) {
        use LeverPosition::*;

        if park == ParkButton::Pressed {
            return (Gear::P, 0);
        }
        if (prev == Center && lever == Up1) || (prev == Up1 && lever == Up2) {
            let next = match gear {
                Gear::P => Gear::N,
                Gear::N => Gear::R,
                Gear::D => Gear::N,
                g => g,
            };
            return (next, 0);
        }
        if (prev == Center && lever == Down1) || (prev == Down1 && lever == Down2) {
            let next = match gear {
                Gear::P => Gear::D,
                Gear::N => Gear::D,
                Gear::R => Gear::N,
                g => g,
            };
            return (next, 0);
        }
        if prev == Center && lever == CenterSide && gear == Gear::D {
            return (Gear::M, 0);
        }
        if prev == CenterSide && lever == Center && gear == Gear::M {
            return (Gear::D, 0);
        }
        if prev == CenterSide && gear == Gear::M {
            let delta = match lever {
                SideUp => -1,
                SideDown => 1,
                _ => 0,
            };
            return (gear, delta);
        }
        (gear, 0)
    }

    #[test]
    fn test_transition_table_exhaustive() {
        for gear in Gear::ALL {
            for lever in LeverPosition::KNOWN {
                for prev in LeverPosition::KNOWN {
                    for park in PARKS {
                        for manual in [0u16, 3] {
                            let mut state = VehicleState::from_parts(gear, prev, prev, manual);
                            state.apply(lever, park);

                            let (gear_after, delta) = expected(gear, lever, prev, park);
                            let manual_after = (manual as i32 + delta).max(0) as u16;

                            assert_eq!(
                                state.current_gear(),
                                gear_after,
                                "gear {:?} prev {:?} lever {:?} park {:?}",
                                gear,
                                prev,
                                lever,
                                park
                            );
                            assert_eq!(state.manual_gear(), manual_after);
                            assert_eq!(state.lever_position(), lever);
                            assert_eq!(state.prev_lever_position(), lever);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_full_drive_cycle() {
        let mut state = VehicleState::new();

        assert_eq!(state.apply(LeverPosition::Down1, ParkButton::Normal), Rule::LeverDown);
        assert_eq!(state.current_gear(), Gear::D);

        assert_eq!(state.apply(LeverPosition::Center, ParkButton::Normal), Rule::ReturnToCenter);
        assert_eq!(state.apply(LeverPosition::CenterSide, ParkButton::Normal), Rule::EnterManual);
        assert_eq!(state.current_gear(), Gear::M);

        assert_eq!(state.apply(LeverPosition::SideDown, ParkButton::Normal), Rule::ManualShift);
        assert_eq!(state.manual_gear(), 1);
        state.apply(LeverPosition::CenterSide, ParkButton::Normal);
        state.apply(LeverPosition::SideDown, ParkButton::Normal);
        state.apply(LeverPosition::CenterSide, ParkButton::Normal);
        assert_eq!(state.manual_gear(), 2);

        state.apply(LeverPosition::SideUp, ParkButton::Normal);
        state.apply(LeverPosition::CenterSide, ParkButton::Normal);
        assert_eq!(state.manual_gear(), 1);

        assert_eq!(state.apply(LeverPosition::Center, ParkButton::Normal), Rule::LeaveManual);
        assert_eq!(state.current_gear(), Gear::D);
        // Manual gear survives leaving M
        assert_eq!(state.manual_gear(), 1);

        assert_eq!(state.apply(LeverPosition::Center, ParkButton::Pressed), Rule::ParkPressed);
        assert_eq!(state.current_gear(), Gear::P);
    }

    #[test]
    fn test_double_push_reaches_reverse() {
        let mut state = VehicleState::new();
        state.apply(LeverPosition::Up1, ParkButton::Normal);
        assert_eq!(state.current_gear(), Gear::N);
        state.apply(LeverPosition::Up2, ParkButton::Normal);
        assert_eq!(state.current_gear(), Gear::R);
    }

    #[test]
    fn test_held_position_fires_once() {
        let mut state = VehicleState::new();
        state.apply(LeverPosition::Up1, ParkButton::Normal);
        for _ in 0..10 {
            assert_eq!(state.apply(LeverPosition::Up1, ParkButton::Normal), Rule::NoMatch);
        }
        assert_eq!(state.current_gear(), Gear::N);
    }

    #[test]
    fn test_manual_floor() {
        let mut state = VehicleState::from_parts(Gear::M, LeverPosition::CenterSide, LeverPosition::CenterSide, 0);
        state.apply(LeverPosition::SideUp, ParkButton::Normal);
        assert_eq!(state.manual_gear(), 0);
    }

    #[test]
    fn test_unknown_lever_byte() {
        let mut state = VehicleState::new();
        assert_eq!(
            state.apply(LeverPosition::Unknown(0x99), ParkButton::Normal),
            Rule::NoMatch
        );
        assert_eq!(state.current_gear(), Gear::P);
        assert_eq!(state.apply(LeverPosition::Center, ParkButton::Normal), Rule::ReturnToCenter);
    }

    #[test]
    fn test_park_wins_over_lever_move() {
        let mut state = VehicleState::new();
        state.apply(LeverPosition::Down1, ParkButton::Normal);
        state.apply(LeverPosition::Center, ParkButton::Normal);
        assert_eq!(state.apply(LeverPosition::Up1, ParkButton::Pressed), Rule::ParkPressed);
        assert_eq!(state.current_gear(), Gear::P);
        assert_eq!(state.prev_lever_position(), LeverPosition::Up1);
    }

    fn lever_strategy() -> impl Strategy<Value = LeverPosition> {
        prop_oneof![
            prop::sample::select(LeverPosition::KNOWN.to_vec()),
            any::<u8>().prop_map(LeverPosition::from_byte),
        ]
    }

    fn park_strategy() -> impl Strategy<Value = ParkButton> {
        prop::sample::select(PARKS.to_vec())
    }

    proptest! {
        #[test]
        fn prop_manual_changes_only_in_m(
            readings in prop::collection::vec((lever_strategy(), park_strategy()), 0..200)
        ) {
            let mut state = VehicleState::new();
            for (lever, park) in readings {
                let before = state;
                let rule = state.apply(lever, park);

                if park.is_pressed() {
                    prop_assert_eq!(state.current_gear(), Gear::P);
                }
                if state.manual_gear() != before.manual_gear() {
                    prop_assert_eq!(rule, Rule::ManualShift);
                    prop_assert_eq!(before.current_gear(), Gear::M);
                    prop_assert_eq!(state.current_gear(), Gear::M);
                }
                if state.current_gear() != before.current_gear() {
                    prop_assert!(rule.changes_gear());
                }
            }
        }
    }
}
