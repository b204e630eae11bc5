//! SV650 ECU diagnostic stream: wire level
//!
//! The ECU repeats a fixed-length status frame with no start byte and no
//! length field. The only framing signal is time: the line goes quiet between
//! frames, so a gap longer than a few character times marks a boundary.
//!
//! ```text
//! ┌────────┬──────────────────────────────┬────────┬────────┬──────────┐
//! │ BYTE 0 │ BYTES 1-4                    │ BYTE 5 │ BYTE 6 │ BYTE 7   │
//! │ status │ fault / dealer / TPS bits    │ coolant│ -      │ CHECKSUM │
//! └────────┴──────────────────────────────┴────────┴────────┴──────────┘
//! ```
//!
//! The wrapping 8-bit sum of all eight bytes equals `0xFF` on a good frame.
//!
//! This crate only enforces length, timing and the checksum. What the bits
//! mean lives in `sv650-core`.

#![no_std]
#![deny(unsafe_code)]

pub mod assembler;
pub mod checksum;
pub mod frame;

pub use assembler::{AssemblerStats, FrameAssembler};
pub use checksum::Checksum;
pub use frame::{Frame, FrameError, FrameLayout, MAX_FRAME_LEN, SV650_FRAME_LEN};
