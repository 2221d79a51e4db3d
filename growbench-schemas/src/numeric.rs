//! A tolerant wrapper for numeric fields that arrive from form-driven input.
//! Values may be real numbers or free text mid-edit; parsing happens once at
//! the boundary so unparsed strings never reach the math layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric field as entered by a user or a draft producer: either an actual
/// number or a string that may or may not parse. Equality is structural, so a
/// `Number(2.5)` and a `Text("2.5")` are distinct until parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumeric {
    Number(f64),
    Text(String),
}

impl RawNumeric {
    /// Parses the field, returning `None` for anything that is not a finite
    /// number. Text follows `parseFloat` semantics: leading whitespace is
    /// skipped and the longest valid decimal prefix is taken, so `"1.5 mL"`
    /// parses to `1.5` while `"mL 1.5"` does not parse.
    pub fn parse(&self) -> Option<f64> {
        match self {
            RawNumeric::Number(v) => v.is_finite().then_some(*v),
            RawNumeric::Text(s) => parse_float_prefix(s),
        }
    }

    /// Parses the field, substituting `default` when it does not parse.
    pub fn parse_or(&self, default: f64) -> f64 {
        self.parse().unwrap_or(default)
    }
}

impl Default for RawNumeric {
    fn default() -> Self {
        RawNumeric::Text(String::new())
    }
}

impl From<f64> for RawNumeric {
    fn from(value: f64) -> Self {
        RawNumeric::Number(value)
    }
}

impl From<&str> for RawNumeric {
    fn from(value: &str) -> Self {
        RawNumeric::Text(value.to_string())
    }
}

impl From<String> for RawNumeric {
    fn from(value: String) -> Self {
        RawNumeric::Text(value)
    }
}

impl fmt::Display for RawNumeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawNumeric::Number(v) => write!(f, "{}", v),
            RawNumeric::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Longest-valid-prefix float parse: optional sign, decimal mantissa,
/// optional exponent. The exponent is only consumed when it carries at least
/// one digit, so `"1e"` parses as `1.0`.
fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let mut mantissa_digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        mantissa_digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exponent_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exponent_start {
            i = j;
        }
    }

    s[..i].parse::<f64>().ok().filter(|v| v.is_finite())
}
