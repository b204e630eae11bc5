//! Frame checksum
//!
//! The ECU closes every frame with a byte chosen so that the wrapping 8-bit
//! sum of the whole frame lands on a fixed value. For the SV650 that value
//! is `0xFF`: the last byte is the ones' complement of the sum of the others.
//!
//! A mismatch is an ordinary outcome on a noisy line, so validation returns a
//! plain `bool` and never fails.

use crate::frame::Frame;

/// Checksum parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksum {
    /// Accumulator start value
    pub seed: u8,
    /// Sum a good frame must produce, checksum byte included
    pub good: u8,
}

impl Checksum {
    /// SV650: plain byte sum, good frames sum to `0xFF`
    pub const SV650: Self = Self {
        seed: 0x00,
        good: 0xFF,
    };

    /// Wrapping sum of `bytes` starting from the seed
    pub fn compute(&self, bytes: &[u8]) -> u8 {
        bytes
            .iter()
            .fold(self.seed, |acc, &byte| acc.wrapping_add(byte))
    }

    /// Check a complete frame
    ///
    /// Pure and deterministic: the same frame always gives the same answer.
    pub fn validate(&self, frame: &Frame) -> bool {
        self.validate_bytes(frame.as_bytes())
    }

    /// Check a raw byte run, checksum byte included
    pub fn validate_bytes(&self, bytes: &[u8]) -> bool {
        !bytes.is_empty() && self.compute(bytes) == self.good
    }

    /// Checksum byte that makes `payload` followed by it a good frame
    pub fn closing_byte(&self, payload: &[u8]) -> u8 {
        self.good.wrapping_sub(self.compute(payload))
    }
}

impl Default for Checksum {
    fn default() -> Self {
        Self::SV650
    }
}
