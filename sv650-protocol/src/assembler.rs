//! Timing-based frame assembler
//!
//! Bytes are accumulated until the layout's frame length is reached. A gap
//! longer than the inter-byte timeout means the line went idle mid-frame: the
//! partial buffer is stale and is dropped, and the byte that ended the gap
//! starts a new frame.
//!
//! Stale drops are not errors. They only show up in [`AssemblerStats`].

use embassy_time::Instant;
use heapless::Vec;
use sv650_hal::RawByte;

use crate::frame::{Frame, FrameLayout, MAX_FRAME_LEN};

/// Assembler diagnostic counters
///
/// All counters saturate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AssemblerStats {
    /// Complete frames emitted
    pub frames: u32,
    /// Partial frames dropped because of a timing gap
    pub stale_discards: u32,
    /// Bytes thrown away with those partial frames
    pub bytes_discarded: u32,
}

/// Groups a byte stream into fixed-length frames
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    layout: FrameLayout,
    buffer: Vec<u8, MAX_FRAME_LEN>,
    last_at: Option<Instant>,
    stats: AssemblerStats,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new(FrameLayout::SV650)
    }
}

impl FrameAssembler {
    /// Create an assembler for `layout`
    ///
    /// The layout is expected to be valid (see [`FrameLayout::validate`]);
    /// lengths above [`MAX_FRAME_LEN`] are clamped.
    pub fn new(layout: FrameLayout) -> Self {
        let layout = FrameLayout {
            len: layout.len.clamp(1, MAX_FRAME_LEN),
            ..layout
        };
        Self {
            layout,
            buffer: Vec::new(),
            last_at: None,
            stats: AssemblerStats::default(),
        }
    }

    /// Layout in use
    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Counters since creation
    pub fn stats(&self) -> AssemblerStats {
        self.stats
    }

    /// Bytes currently held for the in-progress frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any partial frame and forget the last arrival time
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_at = None;
    }

    /// Feed one byte received at `at`
    ///
    /// Returns the completed frame when this byte fills it.
    pub fn feed(&mut self, byte: u8, at: Instant) -> Option<Frame> {
        if self.gap_exceeded(at) && !self.buffer.is_empty() {
            self.stats.stale_discards = self.stats.stale_discards.saturating_add(1);
            self.stats.bytes_discarded = self
                .stats
                .bytes_discarded
                .saturating_add(self.buffer.len() as u32);
            self.buffer.clear();
        }
        self.last_at = Some(at);

        // Cannot overflow: the buffer is drained as soon as it reaches
        // layout.len, which is at most MAX_FRAME_LEN
        let _ = self.buffer.push(byte);

        if self.buffer.len() < self.layout.len {
            return None;
        }

        let frame = Frame::from_buffer(core::mem::take(&mut self.buffer));
        self.stats.frames = self.stats.frames.saturating_add(1);
        Some(frame)
    }

    /// Feed one timestamped byte
    pub fn feed_raw(&mut self, raw: RawByte) -> Option<Frame> {
        self.feed(raw.byte, raw.at)
    }

    /// Feed a run of timestamped bytes
    ///
    /// Returns the first complete frame found, if any. Bytes after that
    /// frame are not consumed.
    pub fn feed_all<I>(&mut self, bytes: &mut I) -> Option<Frame>
    where
        I: Iterator<Item = RawByte>,
    {
        for raw in bytes.by_ref() {
            if let Some(frame) = self.feed_raw(raw) {
                return Some(frame);
            }
        }
        None
    }

    /// Whether the gap since the previous byte restarts framing
    ///
    /// A timestamp earlier than the previous one cannot be measured and is
    /// treated as a gap.
    fn gap_exceeded(&self, at: Instant) -> bool {
        match self.last_at {
            None => false,
            Some(last) => match at.checked_duration_since(last) {
                Some(gap) => gap > self.layout.inter_byte_timeout,
                None => true,
            },
        }
    }
}
