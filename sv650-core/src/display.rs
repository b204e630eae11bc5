//! What to put on the display
//!
//! The display shows one three character code at a time. In dealer mode the
//! TPS trim condition goes along with the fault code; how it is drawn (the
//! reader lights a single segment of the spare digit) is up to the renderer.
//! [`DisplayPolicy::select`] picks the readout for a decode result;
//! [`present`] hands it to a [`StatusDisplay`] implementation, which owns the
//! segment encoding.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::battery::BatteryVoltage;
use crate::decode::DecodeResult;
use crate::monitor::LinkStatus;
use crate::rules::{Condition, DisplayCode};
use crate::temperature::{TemperatureReading, TemperatureUnit};

/// When fault codes are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FaultVisibility {
    /// Show faults whenever one is active
    #[default]
    Always,
    /// Only show faults while the bike is in dealer mode
    DealerModeOnly,
}

/// Something to display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Readout<'a> {
    /// Fault code, plus the TPS trim indicator in dealer mode
    Codes {
        fault: Condition<'a>,
        trim: Option<Condition<'a>>,
    },
    /// Battery voltage at or below the warning threshold
    LowBattery(BatteryVoltage),
    /// Coolant temperature, already in the display unit
    Temperature {
        reading: TemperatureReading,
        unit: TemperatureUnit,
    },
}

/// Readout selection rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayPolicy {
    pub fault_visibility: FaultVisibility,
    /// Show coolant temperature when there is no fault to show
    pub show_temperature: bool,
    pub unit: TemperatureUnit,
    /// Battery warning threshold, `None` to ignore the battery
    pub battery_warn: Option<BatteryVoltage>,
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        Self {
            fault_visibility: FaultVisibility::Always,
            show_temperature: false,
            unit: TemperatureUnit::Celsius,
            battery_warn: Some(BatteryVoltage::default()),
        }
    }
}

impl DisplayPolicy {
    /// Pick the readout for a decode result
    ///
    /// Visible faults come first, then a low battery, then the temperature
    /// (if enabled), then the nominal code. Returns `None` when the frame
    /// failed its checksum: the display keeps whatever it showed last.
    pub fn select<'a>(
        &self,
        result: &DecodeResult<'a>,
        battery: Option<BatteryVoltage>,
    ) -> Option<Readout<'a>> {
        if !result.checksum_valid {
            return None;
        }

        let faults_visible = match self.fault_visibility {
            FaultVisibility::Always => true,
            FaultVisibility::DealerModeOnly => result.dealer_mode,
        };

        let fault = result.shown_fault();
        if faults_visible && fault.is_active() {
            let trim = if result.dealer_mode {
                Some(result.trim.condition())
            } else {
                None
            };
            return Some(Readout::Codes {
                fault: fault.condition(),
                trim,
            });
        }

        if let (Some(voltage), Some(warn)) = (battery, self.battery_warn) {
            if voltage.is_low(warn) {
                return Some(Readout::LowBattery(voltage));
            }
        }

        if self.show_temperature {
            return Some(Readout::Temperature {
                reading: result.temperature.in_unit(self.unit),
                unit: self.unit,
            });
        }

        Some(Readout::Codes {
            fault: result.no_fault,
            trim: None,
        })
    }
}

/// Errors that can occur driving the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Driver did not acknowledge
    Timeout,
    /// Character has no segment pattern
    Unsupported,
}

/// Renderer seam
///
/// Implementations map characters to segments and shift them out.
pub trait StatusDisplay {
    /// Show a three character code and an optional trim indicator
    fn show_code(&mut self, code: DisplayCode, trim: Option<DisplayCode>)
        -> Result<(), DisplayError>;

    /// Show a temperature in range
    fn show_temperature(&mut self, degrees: i16, unit: TemperatureUnit)
        -> Result<(), DisplayError>;

    /// Show a saturated temperature, distinct from any number
    fn show_temperature_saturated(&mut self, reading: TemperatureReading)
        -> Result<(), DisplayError>;

    /// Show a battery voltage warning
    fn show_battery(&mut self, voltage: BatteryVoltage) -> Result<(), DisplayError>;

    /// Show that the ECU is not talking (or talking garbage)
    fn show_no_data(&mut self, status: LinkStatus) -> Result<(), DisplayError>;
}

/// Hand a readout to the display
pub fn present<D: StatusDisplay>(
    readout: &Readout<'_>,
    display: &mut D,
) -> Result<(), DisplayError> {
    match readout {
        Readout::Codes { fault, trim } => display.show_code(fault.code, trim.map(|t| t.code)),
        Readout::LowBattery(voltage) => display.show_battery(*voltage),
        Readout::Temperature { reading, unit } => match reading {
            TemperatureReading::Valid(degrees) => display.show_temperature(*degrees, *unit),
            saturated => display.show_temperature_saturated(*saturated),
        },
    }
}

/// Update the display for one decode result
///
/// Link problems take over the display; otherwise the policy's readout is
/// shown, or nothing is touched if it selects none.
pub fn refresh<D: StatusDisplay>(
    policy: &DisplayPolicy,
    link: LinkStatus,
    result: Option<&DecodeResult<'_>>,
    battery: Option<BatteryVoltage>,
    display: &mut D,
) -> Result<(), DisplayError> {
    if link != LinkStatus::Ok {
        return display.show_no_data(link);
    }
    match result.and_then(|r| policy.select(r, battery)) {
        Some(readout) => present(&readout, display),
        None => Ok(()),
    }
}
