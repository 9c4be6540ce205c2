//! Checksum table and per-identifier seeds
//!
//! The checksum is a CRC-8 (polynomial 0x1D, no reflection, no final XOR)
//! whose initial value depends on the frame identifier. Only the 32
//! identifiers in [`CHECKSUM_SEEDS`] carry a checksum. The backlight frame
//! carries a rolling counter but no checksum; every other identifier is
//! passed through untouched.

use crate::frame::can_ids;

/// CRC-8 generator polynomial
pub const POLYNOMIAL: u8 = 0x1D;

/// Substitution table: `TABLE[i]` is the CRC-8 of the single byte `i`
pub const TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Checksum seed for every identifier that carries a checksum
pub const CHECKSUM_SEEDS: [(u16, u8); 32] = [
    (0x08F, 0x75),
    (0x0A0, 0xBC),
    (0x0A5, 0x16),
    (0x0A6, 0xC2),
    (0x0A7, 0x8E),
    (0x0B0, 0x4C),
    (0x0C2, 0xD8),
    (0x0D9, 0x3E),
    (0x0EF, 0x98),
    (0x12F, 0x60),
    (0x145, 0x48),
    (0x163, 0xA0),
    (0x173, 0x13),
    (0x197, 0x62), // lever position
    (0x199, 0x8F),
    (0x19A, 0x17),
    (0x19F, 0xEF),
    (0x1A1, 0x77),
    (0x1AF, 0xB5),
    (0x1E1, 0x78),
    (0x1FC, 0x66),
    (0x207, 0x51),
    (0x254, 0xB8),
    (0x297, 0xDF),
    (0x2C5, 0xFC),
    (0x2E0, 0x5B),
    (0x2ED, 0x1D),
    (0x302, 0xC3),
    (0x30B, 0xBE),
    (0x3A7, 0x05),
    (0x3F9, 0x38),
    (0x3FD, 0xD7), // gear display
];

/// The one identifier that is counter-stamped without a checksum
pub const COUNTER_ONLY_ID: u16 = can_ids::BACKLIGHT;

/// How an outbound frame identifier is stamped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StampPolicy {
    /// Counter nibble, then checksum over bytes 1.. seeded with `seed`
    Checksummed { seed: u8 },
    /// Counter nibble only
    CounterOnly,
    /// Not stamped (identifiers we only receive, or plain frames)
    Passthrough,
}

/// Look up the checksum seed for an identifier
///
/// Returns `None` for identifiers that carry no checksum. A seed of zero is
/// never used as a "not found" marker.
pub fn checksum_seed(id: u16) -> Option<u8> {
    CHECKSUM_SEEDS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|&(_, seed)| seed)
}

/// Decide how frames with this identifier are stamped
pub fn stamp_policy(id: u16) -> StampPolicy {
    match checksum_seed(id) {
        Some(seed) => StampPolicy::Checksummed { seed },
        None if id == COUNTER_ONLY_ID => StampPolicy::CounterOnly,
        None => StampPolicy::Passthrough,
    }
}

/// Fold `bytes` into a checksum starting from `seed`
pub fn checksum(seed: u8, bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(seed, |crc, &byte| TABLE[(crc ^ byte) as usize])
}
