//! Periodic frame emitters
//!
//! Each emitter builds one outbound frame per tick and runs it through its
//! own [`FrameCodec`], so counters never need to be shared between tasks.
//! Emitters only read vehicle state, through a snapshot.

use shiftpad_protocol::{
    BacklightLevel, BacklightMsg, CanFrame, FrameCodec, FrameError, GearDisplayMsg, HeartbeatMsg,
};

use crate::shared::VehicleSnapshot;

/// Gear display frame, every 100 ms by default
#[derive(Debug, Clone, Default)]
pub struct GearDisplayEmitter {
    codec: FrameCodec,
    flash: bool,
}

impl GearDisplayEmitter {
    /// `flash` sets the blink bit on every indication
    pub fn new(flash: bool) -> Self {
        Self {
            codec: FrameCodec::new(),
            flash,
        }
    }

    pub fn next_frame(&mut self, snapshot: &VehicleSnapshot) -> Result<CanFrame, FrameError> {
        let mut frame = GearDisplayMsg {
            indication: snapshot.display_indication(),
            flash: self.flash,
        }
        .to_frame()?;
        self.codec.stamp_frame(&mut frame);
        Ok(frame)
    }
}

/// Backlight frame, every 1000 ms by default
#[derive(Debug, Clone, Default)]
pub struct BacklightEmitter {
    codec: FrameCodec,
    stamp_counter: bool,
}

impl BacklightEmitter {
    /// With `stamp_counter` the rolling counter goes into byte 1; otherwise
    /// the frame is sent exactly as built.
    pub fn new(stamp_counter: bool) -> Self {
        Self {
            codec: FrameCodec::new(),
            stamp_counter,
        }
    }

    pub fn next_frame(&mut self, level: BacklightLevel) -> Result<CanFrame, FrameError> {
        let mut frame = BacklightMsg { level }.to_frame()?;
        if self.stamp_counter {
            self.codec.stamp_frame(&mut frame);
        }
        Ok(frame)
    }
}

/// Heartbeat beacon, every 640 ms by default
#[derive(Debug, Clone)]
pub struct HeartbeatEmitter {
    codec: FrameCodec,
    bus_id: u8,
}

impl HeartbeatEmitter {
    pub fn new(bus_id: u8) -> Self {
        Self {
            codec: FrameCodec::new(),
            bus_id,
        }
    }

    pub fn next_frame(&mut self) -> Result<CanFrame, FrameError> {
        let mut frame = HeartbeatMsg { bus_id: self.bus_id }.to_frame()?;
        // Heartbeat carries no counter or checksum; the codec passes it through
        self.codec.stamp_frame(&mut frame);
        Ok(frame)
    }
}
