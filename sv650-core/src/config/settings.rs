//! Persisted reader settings
//!
//! Stored as postcard binary data. A version byte guards against reading
//! settings written by an incompatible firmware.

use embassy_time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::battery::{BatteryVoltage, BATTERY_WARN_MV};
use crate::display::{DisplayPolicy, FaultVisibility};
use crate::monitor::{LinkSettings, BLINK_MS, LINK_TIMEOUT_MS, MAX_BAD_FRAMES};
use crate::temperature::TemperatureUnit;

/// Current settings layout version
pub const SETTINGS_VERSION: u8 = 1;

/// Upper bound on the encoded size
pub const MAX_SETTINGS_SIZE: usize = 32;

/// User-tunable knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    /// Layout version, see [`SETTINGS_VERSION`]
    pub version: u8,
    /// Resync gap in microseconds
    pub inter_byte_timeout_us: u32,
    /// Silence before the link is reported lost, in milliseconds
    pub link_timeout_ms: u32,
    /// Consecutive checksum failures before the data is reported bad
    pub max_bad_frames: u8,
    /// Unit for the temperature readout
    pub unit: TemperatureUnit,
    /// When fault codes are shown
    pub fault_visibility: FaultVisibility,
    /// Show coolant temperature when there is no fault to show
    pub show_temperature: bool,
    /// Battery warning threshold in millivolts, `0` disables the warning
    pub battery_warn_mv: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            inter_byte_timeout_us: 4_000,
            link_timeout_ms: LINK_TIMEOUT_MS as u32,
            max_bad_frames: MAX_BAD_FRAMES,
            unit: TemperatureUnit::Celsius,
            fault_visibility: FaultVisibility::Always,
            show_temperature: false,
            battery_warn_mv: BATTERY_WARN_MV,
        }
    }
}

impl Settings {
    /// Resync gap
    pub fn inter_byte_timeout(&self) -> Duration {
        Duration::from_micros(self.inter_byte_timeout_us as u64)
    }

    /// Link monitor thresholds
    pub fn link(&self) -> LinkSettings {
        LinkSettings {
            timeout: Duration::from_millis(self.link_timeout_ms as u64),
            max_bad_frames: self.max_bad_frames,
            blink_half_period: Duration::from_millis(BLINK_MS),
        }
    }

    /// Display selection policy
    pub fn policy(&self) -> DisplayPolicy {
        DisplayPolicy {
            fault_visibility: self.fault_visibility,
            show_temperature: self.show_temperature,
            unit: self.unit,
            battery_warn: (self.battery_warn_mv != 0)
                .then_some(BatteryVoltage::from_millivolts(self.battery_warn_mv)),
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SETTINGS_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        if self.inter_byte_timeout_us == 0 || self.link_timeout_ms == 0 || self.max_bad_frames == 0
        {
            return Err(ConfigError::InvalidSettings);
        }
        Ok(())
    }

    /// Serialize into `buf`, returning the used part
    #[cfg(feature = "serde")]
    pub fn encode<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize and validate
    #[cfg(feature = "serde")]
    pub fn decode(bytes: &[u8]) -> Result<Self, ConfigError> {
        let settings: Settings =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Decode stored bytes, falling back to defaults
    ///
    /// Blank or foreign storage is not an error for the reader; it just runs
    /// with the built-in values.
    #[cfg(feature = "serde")]
    pub fn load_or_default(bytes: &[u8]) -> Self {
        Self::decode(bytes).unwrap_or_default()
    }
}
