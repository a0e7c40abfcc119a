//! Bit addressing within a 64-bit word.
//!
//! Words are addressed as big-endian bit strings: bit 0 is the most
//! significant bit, bit 63 the least significant. A range `[start, end)`
//! therefore selects `end - start` bits counted from the MSB end.

use std::ops::Range;

use crate::error::{PacketCodecError, Result};

/// Number of bits in one FIFO word.
pub const WORD_BITS: u32 = 64;

/// Mask with the low `width` bits set.
pub fn mask(width: u32) -> u64 {
    if width >= WORD_BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Extract the bits in `range` as a right-justified value.
pub fn extract(word: u64, range: Range<u32>) -> u64 {
    debug_assert!(range.start < range.end && range.end <= WORD_BITS);
    let width = range.end - range.start;
    let shift = WORD_BITS - range.end;
    (word >> shift) & mask(width)
}

/// Replace the bits in `range` with the low bits of `field`.
pub fn insert(word: u64, range: Range<u32>, field: u64) -> u64 {
    debug_assert!(range.start < range.end && range.end <= WORD_BITS);
    let width = range.end - range.start;
    let shift = WORD_BITS - range.end;
    let lane_mask = mask(width) << shift;
    (word & !lane_mask) | ((field & mask(width)) << shift)
}

/// Parse the 64-character textual form of a word (`0`/`1`, MSB first).
///
/// Underscores are accepted as visual separators and do not count as bits.
pub fn parse_bits(text: &str) -> Result<u64> {
    let mut word = 0u64;
    let mut count = 0usize;
    for ch in text.trim().chars() {
        let bit = match ch {
            '0' => 0,
            '1' => 1,
            '_' => continue,
            other => {
                return Err(PacketCodecError::NonBinaryDigit {
                    position: count,
                    found: other,
                })
            }
        };
        if count < WORD_BITS as usize {
            word = (word << 1) | bit;
        }
        count += 1;
    }

    if count != WORD_BITS as usize {
        return Err(PacketCodecError::invalid_configuration(
            "bit string",
            format!("expected {WORD_BITS} binary digits, got {count}"),
        ));
    }
    Ok(word)
}

/// Render a word in its 64-character textual form.
pub fn format_bits(word: u64) -> String {
    format!("{word:064b}")
}
