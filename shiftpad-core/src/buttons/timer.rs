//! Press state of one logical output

use shiftpad_protocol::HidButton;

/// What an output is currently doing with its button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonTimer {
    /// Nothing pressed
    #[default]
    Idle,
    /// Pressed, released by the maintenance tick at `deadline_ms`
    PulseUntil { button: HidButton, deadline_ms: u64 },
    /// Pressed until the state that caused it goes away
    Held { button: HidButton },
}

impl ButtonTimer {
    pub fn pulse(button: HidButton, now_ms: u64, duration_ms: u64) -> Self {
        ButtonTimer::PulseUntil {
            button,
            deadline_ms: now_ms.saturating_add(duration_ms),
        }
    }

    /// Button currently pressed, if any
    pub fn pressed(&self) -> Option<HidButton> {
        match *self {
            ButtonTimer::Idle => None,
            ButtonTimer::PulseUntil { button, .. } | ButtonTimer::Held { button } => Some(button),
        }
    }

    /// True once a pulse has run its full duration; holds never expire
    pub fn is_due(&self, now_ms: u64) -> bool {
        match *self {
            ButtonTimer::PulseUntil { deadline_ms, .. } => now_ms >= deadline_ms,
            _ => false,
        }
    }

    pub fn is_held(&self, button: HidButton) -> bool {
        *self == ButtonTimer::Held { button }
    }
}
