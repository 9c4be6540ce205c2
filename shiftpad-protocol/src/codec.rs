//! Outbound frame stamping: rolling counter + checksum
//!
//! Stamping order matters. The counter nibble is written into byte 1 first,
//! then the checksum is folded over bytes 1.. and stored in byte 0, so the
//! checksum covers the counter.

use heapless::FnvIndexMap;

use crate::checksum::{checksum, stamp_policy, StampPolicy, CHECKSUM_SEEDS};
use crate::frame::CanFrame;

/// Counters run 0..=14 and wrap back to 0
pub const COUNTER_MODULUS: u8 = 15;

/// Capacity of the counter table (power of two, covers every stamped id)
pub const MAX_TRACKED_IDS: usize = 64;

// Room for every checksummed id plus the counter-only backlight id
const _: () = assert!(CHECKSUM_SEEDS.len() < MAX_TRACKED_IDS);

/// Result of stamping a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StampOutcome {
    /// Counter and checksum written
    Stamped { counter: u8, checksum: u8 },
    /// Counter written, identifier carries no checksum
    CounterOnly { counter: u8 },
    /// Identifier is not stamped; payload unchanged
    Skipped,
    /// Payload has no byte 1 to hold the counter; payload unchanged
    TooShort,
}

/// Per-identifier rolling counters
///
/// Entries are created on first use and never removed.
#[derive(Debug, Clone, Default)]
pub struct CounterTable {
    counters: FnvIndexMap<u16, u8, MAX_TRACKED_IDS>,
}

impl CounterTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            counters: FnvIndexMap::new(),
        }
    }

    /// Counter value the next transmission of `id` will carry
    pub fn current(&self, id: u16) -> u8 {
        self.counters.get(&id).copied().unwrap_or(0)
    }

    /// Take the current counter for `id` and advance it (mod 15)
    pub fn advance(&mut self, id: u16) -> u8 {
        let counter = self.current(id);
        let stored = self.counters.insert(id, (counter + 1) % COUNTER_MODULUS);
        debug_assert!(stored.is_ok(), "counter table full, id {:#x} untracked", id);
        counter
    }

    /// Number of identifiers seen so far
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// True if no identifier has been stamped yet
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// Stamps outbound frames with counter and checksum
///
/// Each emitter owns its own codec, so counters never need locking.
#[derive(Debug, Clone, Default)]
pub struct FrameCodec {
    counters: CounterTable,
}

impl FrameCodec {
    /// Create a codec with all counters at zero
    pub fn new() -> Self {
        Self {
            counters: CounterTable::new(),
        }
    }

    /// Stamp `payload` in place for transmission with identifier `id`
    pub fn stamp(&mut self, id: u16, payload: &mut [u8]) -> StampOutcome {
        let policy = stamp_policy(id);
        if policy == StampPolicy::Passthrough {
            return StampOutcome::Skipped;
        }
        if payload.len() < 2 {
            return StampOutcome::TooShort;
        }

        let counter = self.counters.advance(id);
        payload[1] = (payload[1] & 0xF0) | counter;

        match policy {
            StampPolicy::Checksummed { seed } => {
                let crc = checksum(seed, &payload[1..]);
                payload[0] = crc;
                StampOutcome::Stamped {
                    counter,
                    checksum: crc,
                }
            }
            _ => StampOutcome::CounterOnly { counter },
        }
    }

    /// Stamp a whole frame in place
    pub fn stamp_frame(&mut self, frame: &mut CanFrame) -> StampOutcome {
        let id = frame.id;
        self.stamp(id, frame.data_mut())
    }

    /// Read access to the counter table
    pub fn counters(&self) -> &CounterTable {
        &self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::can_ids;
    use proptest::prelude::*;

    #[test]
    fn test_gear_display_golden() {
        let mut codec = FrameCodec::new();
        let expected = [0xF3, 0x6E, 0xD4];

        for (counter, crc) in expected.into_iter().enumerate() {
            let mut payload = [0x00, 0x00, 0x20, 0x0C, 0xFF];
            let outcome = codec.stamp(can_ids::GEAR_DISPLAY, &mut payload);
            assert_eq!(
                outcome,
                StampOutcome::Stamped {
                    counter: counter as u8,
                    checksum: crc
                }
            );
            assert_eq!(payload, [crc, counter as u8, 0x20, 0x0C, 0xFF]);
        }
    }

    #[test]
    fn test_counter_preserves_high_nibble() {
        let mut codec = FrameCodec::new();
        for _ in 0..3 {
            codec.stamp(can_ids::GEAR_DISPLAY, &mut [0u8; 5]);
        }
        let mut payload = [0x00, 0xAF, 0x40, 0x0C, 0xFF];
        let outcome = codec.stamp(can_ids::GEAR_DISPLAY, &mut payload);
        assert_eq!(payload[1], 0xA3);
        assert_eq!(
            outcome,
            StampOutcome::Stamped {
                counter: 3,
                checksum: 0x66
            }
        );
    }

    #[test]
    fn test_counter_wraps_at_fifteen() {
        let mut codec = FrameCodec::new();
        let mut seen = [0u8; 32];
        for slot in seen.iter_mut() {
            let mut payload = [0u8; 5];
            codec.stamp(can_ids::GEAR_DISPLAY, &mut payload);
            *slot = payload[1] & 0x0F;
        }
        for (i, value) in seen.iter().enumerate() {
            assert_eq!(*value, (i % 15) as u8);
        }
        assert!(seen.iter().all(|&c| c < 15));
    }

    #[test]
    fn test_counters_are_per_id() {
        let mut codec = FrameCodec::new();
        codec.stamp(can_ids::GEAR_DISPLAY, &mut [0u8; 5]);
        codec.stamp(can_ids::GEAR_DISPLAY, &mut [0u8; 5]);

        let mut payload = [0u8; 4];
        codec.stamp(can_ids::LEVER_POSITION, &mut payload);
        assert_eq!(payload[1], 0);
        assert_eq!(codec.counters().current(can_ids::GEAR_DISPLAY), 2);
        assert_eq!(codec.counters().len(), 2);
    }

    #[test]
    fn test_unknown_id_untouched() {
        let mut codec = FrameCodec::new();
        let mut payload = [0, 0, 0, 0, 0x02, 0, 0, 0x5E];
        let outcome = codec.stamp(can_ids::HEARTBEAT, &mut payload);
        assert_eq!(outcome, StampOutcome::Skipped);
        assert_eq!(payload, [0, 0, 0, 0, 0x02, 0, 0, 0x5E]);
        assert!(codec.counters().is_empty());
    }

    #[test]
    fn test_counter_only_id() {
        let mut codec = FrameCodec::new();
        codec.stamp(can_ids::BACKLIGHT, &mut [0u8; 2]);
        let mut payload = [0xFE, 0x00];
        let outcome = codec.stamp(can_ids::BACKLIGHT, &mut payload);
        assert_eq!(outcome, StampOutcome::CounterOnly { counter: 1 });
        assert_eq!(payload, [0xFE, 0x01]);
    }

    #[test]
    fn test_short_payload_not_stamped() {
        let mut codec = FrameCodec::new();
        let mut payload = [0x55];
        assert_eq!(
            codec.stamp(can_ids::GEAR_DISPLAY, &mut payload),
            StampOutcome::TooShort
        );
        assert_eq!(payload, [0x55]);
        assert_eq!(codec.counters().current(can_ids::GEAR_DISPLAY), 0);
    }

    #[test]
    fn test_every_stamped_id_keeps_its_counter() {
        let mut codec = FrameCodec::new();
        let ids = CHECKSUM_SEEDS
            .iter()
            .map(|&(id, _)| id)
            .chain(core::iter::once(can_ids::BACKLIGHT));

        for round in 0..3u8 {
            for id in ids.clone() {
                let mut payload = [0u8; 8];
                codec.stamp(id, &mut payload);
                assert_eq!(payload[1], round, "id {:#x}", id);
            }
        }
        assert_eq!(codec.counters().len(), CHECKSUM_SEEDS.len() + 1);
    }

    #[test]
    fn test_stamp_frame() {
        let mut codec = FrameCodec::new();
        let mut frame = CanFrame::new(can_ids::GEAR_DISPLAY, &[0x00, 0x00, 0x60, 0x0C, 0xFF]).unwrap();
        codec.stamp_frame(&mut frame);
        assert_eq!(frame.data(), &[0x93, 0x00, 0x60, 0x0C, 0xFF]);
    }

    proptest! {
        #[test]
        fn prop_counter_sequence(transmissions in 1usize..200) {
            let mut table = CounterTable::new();
            let mut last = None;
            for _ in 0..transmissions {
                let value = table.advance(can_ids::GEAR_DISPLAY);
                prop_assert!(value < COUNTER_MODULUS);
                if let Some(prev) = last {
                    prop_assert_eq!(value, (prev + 1) % COUNTER_MODULUS);
                }
                last = Some(value);
            }
        }
    }
}
