//! Vehicle state shared between the CAN receive path and its readers
//!
//! The receive task is the only writer; it holds the one [`StateWriter`]
//! handle. Emitters, the button controller, the supervisor and telemetry
//! read through [`SharedVehicleState::snapshot`], which copies the whole
//! record under the lock, so a reader never sees half of an update.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use portable_atomic::{AtomicBool, Ordering};
use shiftpad_protocol::{Gear, GearIndication, LeverPosition, ParkButton, StateReport};

use crate::state::{Rule, VehicleState};

/// Consistent copy of the shared state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VehicleSnapshot {
    pub vehicle: VehicleState,
    /// Time of the last frame that proved the shifter alive
    pub last_seen_ms: Option<u64>,
    /// Lever position frames applied since boot (wrapping)
    pub lever_frames: u32,
    /// Gear shown on the lever instead of the derived one
    pub indication_override: Option<Gear>,
}

impl Default for VehicleSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleSnapshot {
    pub const fn new() -> Self {
        Self {
            vehicle: VehicleState::new(),
            last_seen_ms: None,
            lever_frames: 0,
            indication_override: None,
        }
    }

    /// Indication the gear display should carry
    pub fn display_indication(&self) -> GearIndication {
        match self.indication_override {
            Some(gear) => GearIndication::from_gear(gear),
            None => self.vehicle.indication(),
        }
    }

    /// Telemetry line for this snapshot
    pub fn state_report(&self) -> StateReport {
        StateReport::new(
            self.vehicle.current_gear(),
            self.vehicle.lever_position(),
            self.vehicle.park_button(),
            self.vehicle.manual_gear(),
        )
    }
}

/// Vehicle state behind a blocking mutex
pub struct SharedVehicleState<M: RawMutex> {
    inner: Mutex<M, RefCell<VehicleSnapshot>>,
    writer_taken: AtomicBool,
}

impl<M: RawMutex> Default for SharedVehicleState<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> SharedVehicleState<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(VehicleSnapshot::new())),
            writer_taken: AtomicBool::new(false),
        }
    }

    /// Copy the current state
    pub fn snapshot(&self) -> VehicleSnapshot {
        self.inner.lock(|cell| *cell.borrow())
    }

    /// Claim the writer handle
    ///
    /// Returns `None` once the handle has been handed out.
    pub fn writer(&self) -> Option<StateWriter<'_, M>> {
        if self.writer_taken.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(StateWriter { shared: self })
        }
    }

    /// Show `gear` on the lever until the derived gear next changes
    pub fn set_indication_override(&self, gear: Gear) {
        self.inner.lock(|cell| {
            cell.borrow_mut().indication_override = Some(gear);
        });
    }
}

/// The single mutating handle to a [`SharedVehicleState`]
pub struct StateWriter<'a, M: RawMutex> {
    shared: &'a SharedVehicleState<M>,
}

impl<M: RawMutex> StateWriter<'_, M> {
    /// Run a lever reading through the state machine
    ///
    /// Also counts as proof of life. Returns the rule that fired and the
    /// state right after the update.
    pub fn apply_lever(
        &mut self,
        lever: LeverPosition,
        park: ParkButton,
        now_ms: u64,
    ) -> (Rule, VehicleSnapshot) {
        self.shared.inner.lock(|cell| {
            let mut snapshot = cell.borrow_mut();
            let gear_before = snapshot.vehicle.current_gear();

            let rule = snapshot.vehicle.apply(lever, park);
            snapshot.last_seen_ms = Some(now_ms);
            snapshot.lever_frames = snapshot.lever_frames.wrapping_add(1);
            if snapshot.vehicle.current_gear() != gear_before {
                snapshot.indication_override = None;
            }

            (rule, *snapshot)
        })
    }

    /// Record a liveness frame that carries no lever data
    pub fn touch(&mut self, now_ms: u64) {
        self.shared.inner.lock(|cell| {
            cell.borrow_mut().last_seen_ms = Some(now_ms);
        });
    }
}
