//! Coolant temperature lookup
//!
//! The ECU reports the coolant sensor as a raw reading. The sensor is an NTC
//! thermistor, so the reading is mapped through a calibration table rather
//! than a formula. Table entries are stored offset so that the useful range
//! fits in a byte.
//!
//! Readings outside the table saturate instead of extrapolating.

use sv650_protocol::Frame;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mapped temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureReading {
    /// Whole degrees in the unit of the curve (or of the last conversion)
    Valid(i16),
    /// Reading below the table start: hotter than the table covers
    TooHigh,
    /// Reading past the table end: colder than the table covers, or the
    /// sensor is disconnected
    TooLow,
}

impl TemperatureReading {
    /// Degrees if the reading is in range
    pub fn degrees(&self) -> Option<i16> {
        match self {
            TemperatureReading::Valid(degrees) => Some(*degrees),
            _ => None,
        }
    }

    /// Convert a Fahrenheit reading to `unit`
    ///
    /// Saturated readings pass through unchanged.
    pub fn in_unit(self, unit: TemperatureUnit) -> Self {
        match self {
            TemperatureReading::Valid(f) => TemperatureReading::Valid(unit.convert_fahrenheit(f)),
            other => other,
        }
    }
}

/// Temperature display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TemperatureUnit {
    Fahrenheit,
    #[default]
    Celsius,
}

impl TemperatureUnit {
    /// Convert whole degrees Fahrenheit, rounding to nearest
    pub fn convert_fahrenheit(self, fahrenheit: i16) -> i16 {
        match self {
            TemperatureUnit::Fahrenheit => fahrenheit,
            TemperatureUnit::Celsius => {
                let scaled = (fahrenheit as i32 - 32) * 5;
                let celsius = if scaled >= 0 {
                    (scaled + 4) / 9
                } else {
                    (scaled - 4) / 9
                };
                celsius as i16
            }
        }
    }

    /// Unit suffix for the display
    pub const fn suffix(self) -> u8 {
        match self {
            TemperatureUnit::Fahrenheit => b'F',
            TemperatureUnit::Celsius => b'C',
        }
    }
}

/// Calibration table problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CurveError {
    /// Table has no entries
    Empty,
    /// Entry at `index` is warmer than the one before it
    NotMonotonic { index: usize },
}

/// Raw reading to temperature table
///
/// Higher raw readings are colder, so values never increase along the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureCurve<'a> {
    /// Raw reading of the first entry
    pub first_raw: u16,
    /// Added to every stored entry to get degrees
    pub offset: i16,
    /// Stored entries, one per raw step
    pub values: &'a [u8],
}

impl<'a> TemperatureCurve<'a> {
    /// Create a curve, checking it is non-increasing
    pub fn new(first_raw: u16, offset: i16, values: &'a [u8]) -> Result<Self, CurveError> {
        let curve = Self {
            first_raw,
            offset,
            values,
        };
        curve.validate()?;
        Ok(curve)
    }

    /// Check the table is non-empty and never increases
    pub fn validate(&self) -> Result<(), CurveError> {
        if self.values.is_empty() {
            return Err(CurveError::Empty);
        }
        match self.values.windows(2).position(|pair| pair[1] > pair[0]) {
            Some(index) => Err(CurveError::NotMonotonic { index: index + 1 }),
            None => Ok(()),
        }
    }

    /// Last raw reading covered by the table
    pub fn last_raw(&self) -> u16 {
        let span = self.values.len().saturating_sub(1);
        self.first_raw.saturating_add(span.min(u16::MAX as usize) as u16)
    }

    /// Map a raw reading
    pub fn map(&self, raw: u16) -> TemperatureReading {
        if raw < self.first_raw {
            return TemperatureReading::TooHigh;
        }
        match self.values.get((raw - self.first_raw) as usize) {
            Some(&stored) => TemperatureReading::Valid((stored as i16).saturating_add(self.offset)),
            None => TemperatureReading::TooLow,
        }
    }
}

/// Where the reading sits in the frame and how to map it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureSource<'a> {
    /// Frame byte carrying the raw reading
    pub byte_index: u8,
    pub curve: TemperatureCurve<'a>,
}

impl TemperatureSource<'_> {
    /// Raw reading from a frame, if the byte exists
    pub fn raw(&self, frame: &Frame) -> Option<u16> {
        frame.get(self.byte_index as usize).map(u16::from)
    }

    /// Map the frame's reading
    ///
    /// A missing byte reads like a disconnected sensor.
    pub fn read(&self, frame: &Frame) -> TemperatureReading {
        match self.raw(frame) {
            Some(raw) => self.curve.map(raw),
            None => TemperatureReading::TooLow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sv650_protocol::FrameLayout;

    const VALUES: &[u8] = &[200, 150, 150, 100, 40];

    fn curve() -> TemperatureCurve<'static> {
        TemperatureCurve::new(10, -20, VALUES).unwrap()
    }

    #[test]
    fn test_map_in_range_applies_offset() {
        let curve = curve();
        assert_eq!(curve.map(10), TemperatureReading::Valid(180));
        assert_eq!(curve.map(12), TemperatureReading::Valid(130));
        assert_eq!(curve.map(14), TemperatureReading::Valid(20));
    }

    #[test]
    fn test_map_saturates() {
        let curve = curve();
        assert_eq!(curve.map(0), TemperatureReading::TooHigh);
        assert_eq!(curve.map(9), TemperatureReading::TooHigh);
        assert_eq!(curve.map(15), TemperatureReading::TooLow);
        assert_eq!(curve.map(u16::MAX), TemperatureReading::TooLow);
        assert_eq!(curve.last_raw(), 14);
    }

    #[test]
    fn test_rejects_rising_curve() {
        assert_eq!(
            TemperatureCurve::new(0, 0, &[10, 9, 11]),
            Err(CurveError::NotMonotonic { index: 2 })
        );
        assert_eq!(TemperatureCurve::new(0, 0, &[]), Err(CurveError::Empty));
    }

    #[test]
    fn test_celsius_rounding() {
        let c = TemperatureUnit::Celsius;
        assert_eq!(c.convert_fahrenheit(32), 0);
        assert_eq!(c.convert_fahrenheit(212), 100);
        assert_eq!(c.convert_fahrenheit(189), 87);
        assert_eq!(c.convert_fahrenheit(68), 20);
        assert_eq!(c.convert_fahrenheit(-40), -40);
        // 33F = 0.56C rounds up
        assert_eq!(c.convert_fahrenheit(33), 1);
        assert_eq!(TemperatureUnit::Fahrenheit.convert_fahrenheit(189), 189);
    }

    #[test]
    fn test_saturated_readings_survive_conversion() {
        let unit = TemperatureUnit::Celsius;
        assert_eq!(
            TemperatureReading::TooHigh.in_unit(unit),
            TemperatureReading::TooHigh
        );
        assert_eq!(
            TemperatureReading::TooLow.in_unit(unit),
            TemperatureReading::TooLow
        );
        assert_eq!(
            TemperatureReading::Valid(212).in_unit(unit),
            TemperatureReading::Valid(100)
        );
    }

    #[test]
    fn test_source_reads_frame_byte() {
        let source = TemperatureSource {
            byte_index: 2,
            curve: curve(),
        };
        let layout = FrameLayout::new(3, embassy_time::Duration::from_millis(4)).unwrap();
        let frame = Frame::new(&layout, &[0, 0, 11]).unwrap();
        assert_eq!(source.raw(&frame), Some(11));
        assert_eq!(source.read(&frame), TemperatureReading::Valid(130));

        let outside = TemperatureSource {
            byte_index: 3,
            curve: curve(),
        };
        assert_eq!(outside.read(&frame), TemperatureReading::TooLow);
    }
}
