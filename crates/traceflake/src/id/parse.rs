use core::str::FromStr;

use crate::{Error, ParseErrorKind, TraceId};

/// Parses the decimal wire form of an identifier.
///
/// Only a non-empty run of ASCII digits is accepted: no sign, no
/// whitespace, no radix prefix. This is stricter than [`u64::from_str`],
/// which accepts a leading `+`.
pub fn parse_decimal(s: &str) -> Result<TraceId, ParseErrorKind> {
    if s.is_empty() {
        return Err(ParseErrorKind::Empty);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidDigit);
    }
    // Digits only, so the sole remaining failure is overflow.
    let raw = s.parse::<u64>().map_err(|_| ParseErrorKind::Overflow)?;
    let id = TraceId::from_raw(raw);
    if !id.is_valid() {
        return Err(ParseErrorKind::ReservedBitSet);
    }
    Ok(id)
}

/// Returns `true` if `s` is a well-formed identifier.
///
/// Intended for input received from untrusted sources before it is trusted
/// as a trace identifier.
///
/// ```
/// use traceflake::is_well_formed;
///
/// assert!(is_well_formed("4194312193"));
/// assert!(!is_well_formed("550e8400-e29b-41d4-a716-446655440000"));
/// assert!(!is_well_formed("-1"));
/// ```
pub fn is_well_formed(s: &str) -> bool {
    parse_decimal(s).is_ok()
}

impl FromStr for TraceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_decimal(s)?)
    }
}
