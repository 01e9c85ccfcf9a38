use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}$").expect("date regex"));
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("time regex"));
static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{8,}$").expect("identifier regex"));
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("number regex"));

/// What a field value looks like, decided purely from its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    Date,
    Time,
    Identifier,
    Number,
    Code,
}

/// Classify a single (already trimmed) field value.
///
/// Order matters: dates and times are digit-only and must win over the
/// NUMBER rule, and 8+ digit runs that are not dates fall through to
/// IDENTIFIER.
#[must_use]
pub fn classify_field(value: &str) -> FieldClass {
    if DATE_RE.is_match(value) && (value.starts_with("19") || value.starts_with("20")) {
        return FieldClass::Date;
    }

    if TIME_RE.is_match(value) && is_plausible_time(value) {
        return FieldClass::Time;
    }

    if NUMBER_RE.is_match(value) && value.len() < 8 {
        return FieldClass::Number;
    }

    if IDENTIFIER_RE.is_match(value) {
        return FieldClass::Identifier;
    }

    FieldClass::Code
}

fn is_plausible_time(value: &str) -> bool {
    let hh: u32 = value[0..2].parse().unwrap_or(99);
    let mm: u32 = value[2..4].parse().unwrap_or(99);
    let ss: u32 = value[4..6].parse().unwrap_or(99);
    hh <= 23 && mm <= 59 && ss <= 59
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_require_century_prefix() {
        assert_eq!(classify_field("20250123"), FieldClass::Date);
        assert_eq!(classify_field("19991231"), FieldClass::Date);
        // 8 digits without 19/20 prefix is an identifier-length digit run.
        assert_eq!(classify_field("31012025"), FieldClass::Identifier);
    }

    #[test]
    fn times_are_bounds_checked() {
        assert_eq!(classify_field("235959"), FieldClass::Time);
        assert_eq!(classify_field("000000"), FieldClass::Time);
        // 24:00:00 is not a time; six digits under 8 chars become NUMBER.
        assert_eq!(classify_field("240000"), FieldClass::Number);
    }

    #[test]
    fn identifiers_are_long_alphanumerics() {
        assert_eq!(classify_field("ABC12345"), FieldClass::Identifier);
        assert_eq!(classify_field("abcdefgh"), FieldClass::Identifier);
        assert_eq!(classify_field("ABC-1234"), FieldClass::Code);
    }

    #[test]
    fn short_digit_runs_are_numbers() {
        assert_eq!(classify_field("0"), FieldClass::Number);
        assert_eq!(classify_field("1234567"), FieldClass::Number);
    }

    #[test]
    fn everything_else_is_code() {
        assert_eq!(classify_field("AB"), FieldClass::Code);
        assert_eq!(classify_field("hello world"), FieldClass::Code);
        assert_eq!(classify_field("XXXX"), FieldClass::Code);
    }
}
