//! SV650 rule tables and coolant curve
//!
//! Bit assignments are reverse engineered from the ECU stream, so the tables
//! only list codes that were confirmed on an SV650. Bytes 1 to 4 carry the
//! fault flags; bits 1-2 of byte 1 are the TPS adjustment field, only
//! meaningful in dealer mode.
//!
//! C11 (cam), C22 (atmosphere) and C44 (heated O2) are believed to sit at
//! byte 3 bit 0, byte 3 bit 6 and byte 4 bit 3 on the DL1000 but were never
//! seen on an SV650 and are left out.

use crate::rules::{Condition, Rule, RuleKind, RuleTable};
use crate::temperature::{TemperatureCurve, TemperatureSource};

/// Dealer mode flag: byte 1, bit 4
pub const DEALER_MODE: Rule<'static> = Rule::flag(1, 0x10, Condition::new(b"C00", "Dealer Mode"));

/// Fault rules, highest priority first
pub const FAULT_RULES: &[Rule<'static>] = &[
    DEALER_MODE,
    Rule::flag(1, 0x01, Condition::new(b"C42", "Ignition Switch")),
    Rule::flag(2, 0x80, Condition::new(b"C41", "FP Relay")),
    Rule::flag(2, 0x10, Condition::new(b"C33", "Injector 2")),
    Rule::flag(2, 0x08, Condition::new(b"C32", "Injector 1")),
    Rule::flag(2, 0x04, Condition::new(b"C31", "Gear Position")),
    Rule::flag(2, 0x02, Condition::new(b"C25", "IG Coil 2")),
    Rule::flag(2, 0x01, Condition::new(b"C24", "IG Coil 1")),
    Rule::flag(3, 0x80, Condition::new(b"C23", "Tip Over")),
    Rule::flag(3, 0x20, Condition::new(b"C21", "Air Temp")),
    Rule::flag(3, 0x10, Condition::new(b"C15", "Engine Temp")),
    Rule::flag(3, 0x08, Condition::new(b"C14", "Primary TPS")),
    Rule::flag(3, 0x04, Condition::new(b"C13", "Air Pressure")),
    Rule::flag(3, 0x02, Condition::new(b"C12", "Crank Position")),
    Rule::flag(4, 0x80, Condition::new(b"C49", "PAIR Valve")),
    Rule::flag(4, 0x40, Condition::new(b"C29", "Secondary TPS")),
    Rule::flag(4, 0x20, Condition::new(b"C28", "STVA Motor")),
];

/// Reported when no fault flag is set
pub const NO_FAULT: Condition<'static> = Condition::new(b"000", "No Error");

/// SV650 fault table
pub const FAULTS: RuleTable<'static> = RuleTable::new(RuleKind::Fault, FAULT_RULES, NO_FAULT);

/// TPS adjustment field: byte 1, bits 1-2
pub const TPS_FIELD_MASK: u8 = 0x06;

/// TPS trim rules
///
/// The three readings share one two-bit field, so each rule carries its own
/// field value.
pub const TRIM_RULES: &[Rule<'static>] = &[
    Rule::field(1, TPS_FIELD_MASK, 0x04, Condition::new(b"HI ", "TPS Adj High")),
    Rule::field(1, TPS_FIELD_MASK, 0x02, Condition::new(b"LO ", "TPS Adj Low")),
    Rule::field(1, TPS_FIELD_MASK, 0x06, Condition::new(b"MID", "TPS Adj Mid")),
];

/// Reported when the TPS field reads zero
pub const NO_TRIM: Condition<'static> = Condition::new(b"---", "TPS No Reading");

/// SV650 TPS trim table
pub const TRIM: RuleTable<'static> = RuleTable::new(RuleKind::TpsTrim, TRIM_RULES, NO_TRIM);

/// Frame byte carrying the coolant sensor reading
pub const COOLANT_BYTE: u8 = 5;

/// Coolant temperature in °F minus 60, indexed by raw reading minus 43
///
/// Raw readings below 43 are hotter than the table (265°F+), readings past
/// the end are colder than 68°F or an open sensor.
pub const COOLANT_TABLE: &[u8] = &[
    205, 203, 201, 199, 197, 196, 194, 192, 190, 188, 187, 185, 184, 183, 181,
    180, 179, 177, 176, 175, 173, 172, 171, 169, 168, 167, 165, 164, 163, 161,
    160, 159, 157, 156, 155, 153, 152, 151, 151, 150, 149, 148, 148, 147, 146,
    145, 145, 144, 143, 142, 142, 141, 140, 139, 139, 138, 137, 136, 136, 135,
    134, 133, 132, 132, 131, 130, 130, 129, 128, 127, 127, 126, 125, 124, 124,
    123, 122, 121, 121, 120, 119, 118, 118, 117, 116, 116, 115, 115, 114, 114,
    113, 113, 113, 112, 112, 111, 111, 110, 110, 109, 109, 109, 108, 107, 107,
    107, 106, 106, 106, 105, 105, 104, 104, 103, 103, 103, 102, 102, 101, 101,
    100, 100, 100, 99, 99, 98, 98, 97, 97, 96, 96, 96, 95, 95, 94,
    94, 94, 93, 93, 92, 92, 91, 91, 90, 90, 90, 89, 89, 88, 88,
    87, 87, 87, 86, 86, 85, 85, 84, 84, 83, 83, 83, 82, 82, 81,
    81, 80, 80, 80, 79, 79, 79, 79, 78, 78, 78, 78, 77, 77, 77,
    76, 76, 76, 76, 75, 75, 75, 74, 74, 74, 74, 73, 73, 73, 73,
    72, 72, 72, 71, 71, 71, 71, 70, 70, 70, 69, 69, 69, 69, 68,
    68, 68, 68, 67, 67, 67, 66, 66, 66, 66, 65, 65, 65, 64, 64,
    64, 64, 63, 63, 63, 63, 62, 62, 62, 61, 61, 61, 61, 60, 60,
    60, 60, 59, 59, 59, 58, 58, 58, 58, 57, 57, 57, 56, 56, 56,
    56, 55, 55, 55, 55, 54, 54, 54, 53, 53, 53, 53, 52, 52, 52,
    51, 51, 51, 51, 50, 50, 50, 50, 49, 49, 49, 48, 48, 48, 48,
    47, 47, 47, 47, 46, 46, 46, 45, 45, 45, 45, 44, 44, 44, 44,
    43, 43, 43, 43, 43, 42, 42, 42, 42, 42, 41, 41, 41, 41, 41,
    40, 40, 40, 40, 40, 40, 39, 39, 39, 39, 39, 38, 38, 38, 38,
    38, 37, 37, 37, 37, 37, 36, 36, 36, 36, 36, 35, 35, 35, 35,
    35, 34, 34, 34, 34, 34, 33, 33, 33, 33, 33, 32, 32, 32, 32,
    32, 31, 31, 31, 31, 31, 31, 30, 30, 30, 30, 30, 29, 29, 29,
    29, 29, 28, 28, 28, 28, 28, 27, 27, 27, 27, 27, 26, 26, 26,
    26, 26, 25, 25, 25, 25, 25, 24, 24, 24, 24, 24, 23, 23, 23,
    23, 23, 22, 22, 22, 22, 22, 22, 21, 21, 21, 21, 21, 20, 20,
    20, 20, 20, 19, 19, 19, 19, 19, 18, 18, 18, 18, 18, 17, 17,
    17, 17, 17, 16, 16, 16, 16, 16, 15, 15, 15, 15, 15, 14, 14,
    14, 14, 14, 13, 13, 13, 13, 13, 13, 12, 12, 12, 12, 12, 11,
    11, 11, 11, 11, 10, 10, 10, 10, 10, 9, 9, 9, 9, 9, 8,
    8, 8,
];

/// SV650 coolant curve
pub const COOLANT_CURVE: TemperatureCurve<'static> = TemperatureCurve {
    first_raw: 43,
    offset: 60,
    values: COOLANT_TABLE,
};

/// SV650 coolant source
pub const COOLANT: TemperatureSource<'static> = TemperatureSource {
    byte_index: COOLANT_BYTE,
    curve: COOLANT_CURVE,
};
