//! Battery voltage warning
//!
//! The voltage is measured on an analog input outside this crate and handed
//! in already scaled. Only the low voltage decision lives here.

/// Default warning threshold in millivolts
pub const BATTERY_WARN_MV: u16 = 13_300;

/// A battery voltage reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryVoltage {
    millivolts: u16,
}

impl BatteryVoltage {
    pub const fn from_millivolts(millivolts: u16) -> Self {
        Self { millivolts }
    }

    /// From volts, rounded to the nearest millivolt
    ///
    /// Negative and NaN inputs read as zero; large ones saturate.
    pub fn from_volts(volts: f32) -> Self {
        Self {
            millivolts: (volts * 1000.0 + 0.5) as u16,
        }
    }

    pub const fn millivolts(&self) -> u16 {
        self.millivolts
    }

    /// Tenths of a volt, rounded to nearest (`133` for 13.3 V)
    pub const fn tenths(&self) -> u16 {
        self.millivolts.saturating_add(50) / 100
    }

    /// At or below `threshold`
    pub fn is_low(&self, threshold: BatteryVoltage) -> bool {
        *self <= threshold
    }
}

impl Default for BatteryVoltage {
    fn default() -> Self {
        Self::from_millivolts(BATTERY_WARN_MV)
    }
}
