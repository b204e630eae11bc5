//! Board-agnostic decode logic for the SV650 ECU reader
//!
//! This crate turns validated frames into something worth showing:
//!
//! - Priority-ordered fault and TPS trim rule tables and their matcher
//! - Coolant temperature curve lookup and unit conversion
//! - Battery low voltage warning
//! - Decoder configuration (swappable tables, persisted settings)
//! - The byte-in, result-out [`Decoder`] pipeline
//! - Link health monitoring (no data / bad data, EFI warning lamp)
//! - Display selection policy and the renderer seam
//!
//! Nothing here touches hardware. Bytes come in through
//! [`sv650_hal::TimedRx`], results go out through [`display::StatusDisplay`].

#![no_std]
#![deny(unsafe_code)]

pub mod battery;
pub mod config;
pub mod decode;
pub mod decoder;
pub mod display;
pub mod monitor;
pub mod rules;
pub mod tables;
pub mod temperature;

pub use battery::BatteryVoltage;
pub use config::{ConfigError, DecoderConfig, Settings};
pub use decode::{decode, DecodeResult};
pub use decoder::{Decoder, DecoderStats};
pub use display::{DisplayError, DisplayPolicy, FaultVisibility, Readout, StatusDisplay};
pub use monitor::{LinkMonitor, LinkSettings, LinkStatus};
pub use rules::{Condition, DisplayCode, Match, Rule, RuleKind, RuleTable};
pub use temperature::{TemperatureCurve, TemperatureReading, TemperatureSource, TemperatureUnit};
