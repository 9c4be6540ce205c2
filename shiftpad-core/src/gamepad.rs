//! Gamepad report shared by the button controller and the command channel
//!
//! Both paths toggle bits in the same report. Every change happens under
//! one lock and is published from inside it, so two writers flipping
//! different buttons can never lose each other's bit, and the USB task
//! always receives the latest complete report.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, Ordering};
use shiftpad_protocol::{ButtonAction, GamepadReport, HidButton};

use crate::traits::{HidError, HidSink};

/// Report state plus host readiness
pub struct SharedGamepad<M: RawMutex> {
    report: Mutex<M, Cell<GamepadReport>>,
    ready: AtomicBool,
    changed: Signal<M, GamepadReport>,
}

impl<M: RawMutex> Default for SharedGamepad<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> SharedGamepad<M> {
    pub const fn new() -> Self {
        Self {
            report: Mutex::new(Cell::new(GamepadReport::neutral())),
            ready: AtomicBool::new(false),
            changed: Signal::new(),
        }
    }

    /// Host configured (and not suspended)
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Track host readiness; the report is republished when it comes up
    pub fn set_ready(&self, ready: bool) {
        let was_ready = self.ready.swap(ready, Ordering::AcqRel);
        if ready && !was_ready {
            self.report.lock(|cell| self.changed.signal(cell.get()));
        }
    }

    pub fn report(&self) -> GamepadReport {
        self.report.lock(|cell| cell.get())
    }

    /// Set or clear one button
    ///
    /// Returns the report after the change. Redundant presses and releases
    /// succeed without publishing anything.
    pub fn apply(&self, button: HidButton, action: ButtonAction) -> Result<GamepadReport, HidError> {
        if !self.is_ready() {
            return Err(HidError::NotReady);
        }
        Ok(self.report.lock(|cell| {
            let mut report = cell.get();
            if report.apply(button, action) {
                cell.set(report);
                self.changed.signal(report);
            }
            report
        }))
    }

    /// Release buttons even while the host is away
    ///
    /// The stored report is cleared at once. It is published now if the
    /// host is ready, otherwise on the next [`set_ready`](Self::set_ready).
    pub fn force_release(&self, buttons: &[HidButton]) -> GamepadReport {
        self.report.lock(|cell| {
            let mut report = cell.get();
            let mut changed = false;
            for &button in buttons {
                changed |= report.apply(button, ButtonAction::Release);
            }
            if changed {
                cell.set(report);
                if self.is_ready() {
                    self.changed.signal(report);
                }
            }
            report
        })
    }

    /// Wait for the next published report
    pub async fn wait_changed(&self) -> GamepadReport {
        self.changed.wait().await
    }

    /// A [`HidSink`] writing into this report
    pub fn sink(&self) -> GamepadSink<'_, M> {
        GamepadSink { gamepad: self }
    }
}

/// [`HidSink`] over a [`SharedGamepad`]
pub struct GamepadSink<'a, M: RawMutex> {
    gamepad: &'a SharedGamepad<M>,
}

impl<M: RawMutex> HidSink for GamepadSink<'_, M> {
    fn is_ready(&self) -> bool {
        self.gamepad.is_ready()
    }

    fn send_button(&mut self, button: HidButton, action: ButtonAction) -> Result<(), HidError> {
        self.gamepad.apply(button, action).map(|_| ())
    }

    fn force_release(&mut self, buttons: &[HidButton]) {
        self.gamepad.force_release(buttons);
    }
}
