//! Frame to status decoding
//!
//! The checksum gate and the three lookups run independently over the same
//! frame. All fields are filled even when the checksum fails; callers decide
//! whether to trust them (the display policy does not).

use sv650_protocol::Frame;

use crate::config::DecoderConfig;
use crate::rules::{Condition, Match, Rule};
use crate::temperature::TemperatureReading;

/// Status decoded from one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeResult<'a> {
    /// Highest priority active fault, or the nominal condition
    pub fault: Match<'a>,
    /// Highest priority active fault other than the dealer mode flag
    pub diagnostic: Match<'a>,
    /// Fault table's nominal condition, shown when a fault is hidden
    pub no_fault: Condition<'a>,
    /// TPS trim reading, or the nominal condition
    pub trim: Match<'a>,
    /// Coolant temperature in the curve's unit (°F for the SV650)
    pub temperature: TemperatureReading,
    /// Dealer (diagnostic) mode flag
    pub dealer_mode: bool,
    /// Frame passed the checksum; other fields are untrusted when false
    pub checksum_valid: bool,
}

impl<'a> DecodeResult<'a> {
    /// Active fault rule, if any
    pub fn fault_rule(&self) -> Option<&'a Rule<'a>> {
        self.fault.rule()
    }

    /// Fault to put on the display
    ///
    /// In dealer mode the dealer flag gives way to any real fault below it,
    /// and is only shown when nothing else is active.
    pub fn shown_fault(&self) -> Match<'a> {
        if self.dealer_mode && self.diagnostic.is_active() {
            self.diagnostic
        } else {
            self.fault
        }
    }

    /// Active TPS trim rule, if any
    pub fn trim_rule(&self) -> Option<&'a Rule<'a>> {
        self.trim.rule()
    }
}

/// Decode one complete frame
pub fn decode<'a>(config: &DecoderConfig<'a>, frame: &Frame) -> DecodeResult<'a> {
    let bytes = frame.as_bytes();
    let fault = config.faults.evaluate(frame);
    DecodeResult {
        fault,
        diagnostic: match &config.dealer_mode {
            Some(rule) => config.faults.evaluate_except(bytes, rule),
            None => fault,
        },
        no_fault: config.faults.nominal,
        trim: config.trim.evaluate(frame),
        temperature: config.temperature.read(frame),
        dealer_mode: config
            .dealer_mode
            .as_ref()
            .is_some_and(|rule| rule.matches(bytes)),
        checksum_valid: config.checksum.validate(frame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SV650;
    use crate::rules::{RuleKind, RuleTable};
    use crate::tables;
    use sv650_protocol::FrameLayout;

    /// Captured idle frame: air temp sensor unplugged, coolant raw 0x6E
    const CAPTURE: [u8; 8] = [0x5A, 0x40, 0x00, 0x20, 0x00, 0x6E, 0x00, 0xD7];

    fn frame(bytes: &[u8]) -> Frame {
        Frame::new(&FrameLayout::SV650, bytes).unwrap()
    }

    #[test]
    fn test_capture_decodes() {
        let result = decode(&SV650, &frame(&CAPTURE));
        assert!(result.checksum_valid);
        assert!(!result.dealer_mode);
        assert_eq!(result.fault.condition().code.as_str(), "C21");
        assert_eq!(result.fault_rule().map(|r| r.condition.label), Some("Air Temp"));
        assert_eq!(result.trim, Match::Nominal(tables::NO_TRIM));
        assert_eq!(result.trim_rule(), None);
        assert_eq!(result.temperature, TemperatureReading::Valid(189));
    }

    #[test]
    fn test_corrupt_checksum_still_decodes_fields() {
        let mut bytes = CAPTURE;
        bytes[7] ^= 0xFF;
        let result = decode(&SV650, &frame(&bytes));
        assert!(!result.checksum_valid);
        assert_eq!(result.fault.condition().code.as_str(), "C21");
    }

    #[test]
    fn test_dealer_mode_with_trim() {
        let mut bytes = [0x5A, 0x16, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00];
        bytes[7] = SV650.checksum.closing_byte(&bytes[..7]);
        let result = decode(&SV650, &frame(&bytes));
        assert!(result.checksum_valid);
        assert!(result.dealer_mode);
        assert_eq!(result.fault.condition().code.as_str(), "C00");
        assert_eq!(result.trim.condition().label, "TPS Adj Mid");
        assert!(!result.diagnostic.is_active());
        assert_eq!(result.shown_fault().condition().code.as_str(), "C00");
        // Raw 0x20 is below the curve
        assert_eq!(result.temperature, TemperatureReading::TooHigh);
    }

    #[test]
    fn test_dealer_mode_gives_way_to_real_fault() {
        let mut bytes = [0x5A, 0x10, 0x80, 0x00, 0x00, 0x6E, 0x00, 0x00];
        bytes[7] = SV650.checksum.closing_byte(&bytes[..7]);
        let result = decode(&SV650, &frame(&bytes));
        assert_eq!(result.fault.condition().code.as_str(), "C00");
        assert_eq!(result.diagnostic.condition().code.as_str(), "C41");
        assert_eq!(result.shown_fault().condition().code.as_str(), "C41");
    }

    #[test]
    fn test_clean_frame_is_nominal() {
        let mut bytes = [0x5A, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00];
        bytes[7] = SV650.checksum.closing_byte(&bytes[..7]);
        let result = decode(&SV650, &frame(&bytes));
        assert_eq!(result.fault, Match::Nominal(tables::NO_FAULT));
        assert_eq!(result.fault_rule(), None);
        assert_eq!(result.temperature.degrees(), Some(128));
    }

    #[test]
    fn test_synthetic_tables() {
        const FAULTS: &[Rule<'static>] = &[Rule::flag(0, 0x01, Condition::new(b"E01", "Synthetic"))];
        let config = DecoderConfig {
            faults: RuleTable::new(RuleKind::Fault, FAULTS, Condition::new(b"OK ", "Fine")),
            dealer_mode: None,
            ..DecoderConfig::SV650
        };
        let mut bytes = [0x01, 0x10, 0, 0, 0, 0, 0, 0];
        bytes[7] = config.checksum.closing_byte(&bytes[..7]);
        let result = decode(&config, &frame(&bytes));
        assert_eq!(result.fault.condition().code.as_str(), "E01");
        assert!(!result.dealer_mode);
    }
}
