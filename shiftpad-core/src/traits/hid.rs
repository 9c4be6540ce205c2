//! HID output trait for the button emulation controller

use shiftpad_protocol::{ButtonAction, HidButton};

/// Errors that can occur when driving the gamepad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidError {
    /// Host has not configured the device (or it is suspended)
    NotReady,
}

/// Trait for a gamepad the controller can press buttons on
///
/// Implementations must tolerate redundant calls: pressing a pressed
/// button or releasing a released one is not an error.
pub trait HidSink {
    /// True while the host is ready to receive reports
    fn is_ready(&self) -> bool;

    /// Set one button and publish the resulting report
    fn send_button(&mut self, button: HidButton, action: ButtonAction) -> Result<(), HidError>;

    /// Clear `buttons` whether or not the host is ready
    ///
    /// The cleared state must survive until the host comes back, so a
    /// button released while the host is away is never reported pressed.
    fn force_release(&mut self, buttons: &[HidButton]);
}
