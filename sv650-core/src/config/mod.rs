//! Decoder configuration
//!
//! [`DecoderConfig`] carries everything the decode path reads: frame layout,
//! checksum parameters, both rule tables and the temperature source. The
//! SV650 values are a constant; tests and other ECU variants supply their
//! own.
//!
//! [`Settings`] holds the few scalar knobs worth persisting, stored as
//! postcard binary data.

pub mod settings;

pub use settings::{Settings, MAX_SETTINGS_SIZE, SETTINGS_VERSION};

use embassy_time::Duration;
use sv650_protocol::{Checksum, FrameError, FrameLayout};

use crate::rules::{Rule, RuleKind, RuleTable};
use crate::tables;
use crate::temperature::{CurveError, TemperatureSource};

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Frame layout out of bounds
    Layout(FrameError),
    /// Rule tests a byte past the end of the frame
    RuleOutOfFrame { kind: RuleKind, index: usize },
    /// Rule value has bits outside its mask, or the mask is empty
    UnreachableRule { kind: RuleKind, index: usize },
    /// Dealer mode rule cannot match
    InvalidDealerRule,
    /// Temperature byte past the end of the frame
    TemperatureOutOfFrame,
    /// Temperature curve malformed
    Curve(CurveError),
    /// Settings value out of range
    InvalidSettings,
    /// Settings did not fit the buffer
    Serialize,
    /// Settings bytes could not be decoded
    Deserialize,
    /// Settings written by another firmware version
    VersionMismatch,
}

impl From<FrameError> for ConfigError {
    fn from(e: FrameError) -> Self {
        ConfigError::Layout(e)
    }
}

impl From<CurveError> for ConfigError {
    fn from(e: CurveError) -> Self {
        ConfigError::Curve(e)
    }
}

/// Everything the decode path needs
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderConfig<'a> {
    pub layout: FrameLayout,
    pub checksum: Checksum,
    pub faults: RuleTable<'a>,
    pub trim: RuleTable<'a>,
    pub temperature: TemperatureSource<'a>,
    /// Flag reported as `DecodeResult::dealer_mode`
    pub dealer_mode: Option<Rule<'a>>,
}

/// Built-in SV650 configuration
pub static SV650: DecoderConfig<'static> = DecoderConfig::SV650;

impl DecoderConfig<'static> {
    /// SV650 protocol and tables
    pub const SV650: Self = Self {
        layout: FrameLayout::SV650,
        checksum: Checksum::SV650,
        faults: tables::FAULTS,
        trim: tables::TRIM,
        temperature: tables::COOLANT,
        dealer_mode: Some(tables::DEALER_MODE),
    };
}

impl Default for DecoderConfig<'static> {
    fn default() -> Self {
        Self::SV650
    }
}

impl<'a> DecoderConfig<'a> {
    /// Same configuration with another resync gap
    pub fn with_inter_byte_timeout(self, timeout: Duration) -> Self {
        Self {
            layout: FrameLayout {
                inter_byte_timeout: timeout,
                ..self.layout
            },
            ..self
        }
    }

    /// Same configuration with the persisted knobs applied
    pub fn with_settings(self, settings: &Settings) -> Self {
        self.with_inter_byte_timeout(settings.inter_byte_timeout())
    }

    /// Check the configuration is self-consistent
    ///
    /// Run once when a decoder is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        let len = self.layout.len;

        for table in [&self.faults, &self.trim] {
            if let Some(index) = table.first_out_of_frame(len) {
                return Err(ConfigError::RuleOutOfFrame {
                    kind: table.kind,
                    index,
                });
            }
            if let Some(index) = table.first_unreachable() {
                return Err(ConfigError::UnreachableRule {
                    kind: table.kind,
                    index,
                });
            }
        }

        if let Some(rule) = &self.dealer_mode {
            if !rule.is_reachable() || rule.byte_index as usize >= len {
                return Err(ConfigError::InvalidDealerRule);
            }
        }

        if self.temperature.byte_index as usize >= len {
            return Err(ConfigError::TemperatureOutOfFrame);
        }
        self.temperature.curve.validate()?;

        Ok(())
    }
}
