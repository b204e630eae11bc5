//! Frame type and layout
//!
//! A frame is exactly `layout.len` bytes. It is built once by the assembler
//! and never mutated afterwards.

use embassy_time::Duration;
use heapless::Vec;

/// Largest frame length any layout may declare
pub const MAX_FRAME_LEN: usize = 32;

/// SV650 frame length in bytes
pub const SV650_FRAME_LEN: usize = 8;

/// Errors that can occur while building a frame or a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Byte count differs from the layout's frame length
    LengthMismatch { expected: usize, actual: usize },
    /// Layout length is zero or exceeds [`MAX_FRAME_LEN`]
    InvalidLength,
    /// Inter-byte timeout is zero
    InvalidTimeout,
}

/// Shape and timing of a frame on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameLayout {
    /// Frame length in bytes, checksum included
    pub len: usize,
    /// Gap after which a partial frame is considered stale
    ///
    /// A gap strictly longer than this restarts framing.
    pub inter_byte_timeout: Duration,
}

impl FrameLayout {
    /// SV650 layout: 8 bytes, resync after 4 ms of silence
    ///
    /// One character takes ~1.3 ms at 7800 baud 8N1, so 4 ms is three
    /// missing characters and well short of the idle time between frames.
    pub const SV650: Self = Self {
        len: SV650_FRAME_LEN,
        inter_byte_timeout: Duration::from_millis(4),
    };

    /// Create a layout, checking its bounds
    pub fn new(len: usize, inter_byte_timeout: Duration) -> Result<Self, FrameError> {
        let layout = Self {
            len,
            inter_byte_timeout,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Check the layout bounds
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.len == 0 || self.len > MAX_FRAME_LEN {
            return Err(FrameError::InvalidLength);
        }
        if self.inter_byte_timeout.as_ticks() == 0 {
            return Err(FrameError::InvalidTimeout);
        }
        Ok(())
    }

    /// Index of the trailing checksum byte
    pub const fn checksum_index(&self) -> usize {
        self.len.saturating_sub(1)
    }
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self::SV650
    }
}

/// One complete, fixed-length frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    bytes: Vec<u8, MAX_FRAME_LEN>,
}

impl Frame {
    /// Build a frame from exactly `layout.len` bytes
    pub fn new(layout: &FrameLayout, bytes: &[u8]) -> Result<Self, FrameError> {
        layout.validate()?;
        if bytes.len() != layout.len {
            return Err(FrameError::LengthMismatch {
                expected: layout.len,
                actual: bytes.len(),
            });
        }

        let mut vec = Vec::new();
        vec.extend_from_slice(bytes)
            .map_err(|_| FrameError::InvalidLength)?;
        Ok(Self { bytes: vec })
    }

    /// Take ownership of an assembled buffer
    ///
    /// The assembler guarantees the length.
    pub(crate) fn from_buffer(bytes: Vec<u8, MAX_FRAME_LEN>) -> Self {
        Self { bytes }
    }

    /// All bytes, checksum included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte at `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Frame length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a constructed frame
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Trailing checksum byte
    pub fn checksum_byte(&self) -> u8 {
        self.bytes.last().copied().unwrap_or(0)
    }
}
