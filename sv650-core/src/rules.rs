//! Priority-ordered bit rule tables
//!
//! Each rule tests one frame byte: the byte is masked and compared against the
//! value that signals that rule's condition. Most rules test a single flag
//! bit, so `value == mask`. Multi-bit fields carry several conditions under
//! one mask, each with its own `value`; a plain "all mask bits set" test
//! cannot tell them apart.
//!
//! Tables are scanned in order and the first matching rule wins. Several
//! conditions can be active in one frame, only the highest priority one is
//! reported. When nothing matches, the table's explicit nominal condition is
//! returned instead.

use sv650_protocol::Frame;

/// Three display characters for a condition
///
/// ASCII; mapping to segments is the renderer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayCode(pub [u8; 3]);

impl DisplayCode {
    /// Wrap three ASCII characters
    pub const fn new(chars: &[u8; 3]) -> Self {
        Self(*chars)
    }

    /// Raw characters
    pub const fn chars(&self) -> [u8; 3] {
        self.0
    }

    /// Characters as text, `"???"` if not valid UTF-8
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("???")
    }
}

/// What a matched rule (or the nominal state) reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Condition<'a> {
    /// Code for the display
    pub code: DisplayCode,
    /// Short description, at most 16 characters
    pub label: &'a str,
}

impl<'a> Condition<'a> {
    pub const fn new(code: &[u8; 3], label: &'a str) -> Self {
        Self {
            code: DisplayCode::new(code),
            label,
        }
    }
}

/// One masked byte comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rule<'a> {
    /// Frame byte to test
    pub byte_index: u8,
    /// Bits of that byte the rule looks at
    pub mask: u8,
    /// Masked value that signals this condition
    pub value: u8,
    /// Reported when the rule matches
    pub condition: Condition<'a>,
}

impl<'a> Rule<'a> {
    /// Single-bit rule: active when every bit of `mask` is set
    pub const fn flag(byte_index: u8, mask: u8, condition: Condition<'a>) -> Self {
        Self {
            byte_index,
            mask,
            value: mask,
            condition,
        }
    }

    /// Field rule: active when the masked byte equals `value`
    pub const fn field(byte_index: u8, mask: u8, value: u8, condition: Condition<'a>) -> Self {
        Self {
            byte_index,
            mask,
            value,
            condition,
        }
    }

    /// Test the rule against raw frame bytes
    ///
    /// A byte index past the end of the frame never matches.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        bytes
            .get(self.byte_index as usize)
            .is_some_and(|&byte| byte & self.mask == self.value)
    }

    /// Whether the rule can ever match
    ///
    /// A `value` with bits outside `mask` is unreachable. So is a zero
    /// mask, which would match every frame.
    pub const fn is_reachable(&self) -> bool {
        self.mask != 0 && self.value & !self.mask == 0
    }
}

/// Which table a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RuleKind {
    /// Diagnostic trouble codes
    Fault,
    /// Throttle position sensor trim indicator
    TpsTrim,
}

/// Result of scanning a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Match<'a> {
    /// A rule matched; `priority` is its table index (0 = highest)
    Active {
        priority: usize,
        rule: &'a Rule<'a>,
    },
    /// No rule matched
    Nominal(Condition<'a>),
}

impl<'a> Match<'a> {
    /// Condition to report, matched or nominal
    pub fn condition(&self) -> Condition<'a> {
        match self {
            Match::Active { rule, .. } => rule.condition,
            Match::Nominal(condition) => *condition,
        }
    }

    /// Matched rule, if any
    pub fn rule(&self) -> Option<&'a Rule<'a>> {
        match self {
            Match::Active { rule, .. } => Some(rule),
            Match::Nominal(_) => None,
        }
    }

    /// Whether a rule matched
    pub fn is_active(&self) -> bool {
        matches!(self, Match::Active { .. })
    }
}

/// Ordered rule table with an explicit nominal default
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RuleTable<'a> {
    pub kind: RuleKind,
    /// Rules in priority order
    pub rules: &'a [Rule<'a>],
    /// Reported when no rule matches
    pub nominal: Condition<'a>,
}

impl<'a> RuleTable<'a> {
    pub const fn new(kind: RuleKind, rules: &'a [Rule<'a>], nominal: Condition<'a>) -> Self {
        Self {
            kind,
            rules,
            nominal,
        }
    }

    /// Scan the table against a frame
    pub fn evaluate(&self, frame: &Frame) -> Match<'a> {
        self.evaluate_bytes(frame.as_bytes())
    }

    /// Scan the table against raw frame bytes
    pub fn evaluate_bytes(&self, bytes: &[u8]) -> Match<'a> {
        self.scan(bytes, |_| true)
    }

    /// Scan the table, passing over `skip`
    ///
    /// A mode flag at the top of the table always wins the plain scan; this
    /// finds the highest priority condition below it.
    pub fn evaluate_except(&self, bytes: &[u8], skip: &Rule<'a>) -> Match<'a> {
        self.scan(bytes, |rule| rule != skip)
    }

    fn scan<F>(&self, bytes: &[u8], eligible: F) -> Match<'a>
    where
        F: Fn(&Rule<'a>) -> bool,
    {
        let rules: &'a [Rule<'a>] = self.rules;
        rules
            .iter()
            .enumerate()
            .find(|(_, rule)| eligible(rule) && rule.matches(bytes))
            .map(|(priority, rule)| Match::Active { priority, rule })
            .unwrap_or(Match::Nominal(self.nominal))
    }

    /// Index of the first rule that tests a byte at or past `frame_len`
    pub fn first_out_of_frame(&self, frame_len: usize) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| rule.byte_index as usize >= frame_len)
    }

    /// Index of the first rule that can never match
    pub fn first_unreachable(&self) -> Option<usize> {
        self.rules.iter().position(|rule| !rule.is_reachable())
    }
}
