//! SV650 reader Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the decode core is driven through.
//! Chip-specific code implements these traits; the core never touches a
//! peripheral directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  sv650-core (decoder, display policy)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sv650-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  board support (UART ISR, lamp GPIO)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartRx`] - raw serial receive from the ECU line
//! - [`uart::TimedRx`] - receive with per-byte arrival timestamps
//! - [`uart::Clock`] - monotonic time source for [`uart::StampedRx`]
//! - [`gpio::OutputPin`] - EFI warning lamp output

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use uart::{Clock, RawByte, StampedRx, TimedRx, UartConfig, UartRx};
