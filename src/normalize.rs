//! Cell-level normalization for the wide congestion sheet.
//!
//! Nothing in here fails: an unmatched time label passes through untouched and
//! an unparseable reading becomes `None`.

use once_cell::sync::Lazy;
use regex::Regex;

static TIME_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)시(\d+)분").expect("time label pattern is valid"));

static CANONICAL_SLOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("canonical slot pattern is valid"));

/// A single raw cell as it arrives from the source table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawCell<'a> {
    Missing,
    Text(&'a str),
    Number(f64),
}

impl<'a> From<&'a str> for RawCell<'a> {
    fn from(value: &'a str) -> Self {
        RawCell::Text(value)
    }
}

impl<'a> From<Option<&'a str>> for RawCell<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(RawCell::Missing, RawCell::Text)
    }
}

impl From<f64> for RawCell<'_> {
    fn from(value: f64) -> Self {
        RawCell::Number(value)
    }
}

impl From<i64> for RawCell<'_> {
    fn from(value: i64) -> Self {
        RawCell::Number(value as f64)
    }
}

impl From<i32> for RawCell<'_> {
    fn from(value: i32) -> Self {
        RawCell::Number(f64::from(value))
    }
}

/// Converts a `<hour>시<minute>분` label into `HH:MM`.
///
/// Hour and minute are zero-padded independently, so `5시30분` becomes `05:30`
/// and `12시0분` becomes `12:00`. Labels that do not start with the pattern are
/// returned unchanged.
pub fn normalize_time_slot(raw: &str) -> String {
    match TIME_LABEL.captures(raw) {
        Some(caps) => format!("{:0>2}:{:0>2}", &caps[1], &caps[2]),
        None => raw.to_string(),
    }
}

/// Returns true when `slot` already has the `HH:MM` shape.
pub fn is_canonical_time_slot(slot: &str) -> bool {
    CANONICAL_SLOT.is_match(slot)
}

/// Coerces a raw reading into a congestion value.
///
/// Blank text, unparseable text and non-finite numbers are missing. Any other
/// number is kept as-is, including negative or implausibly large readings.
pub fn normalize_congestion<'a>(raw: impl Into<RawCell<'a>>) -> Option<f64> {
    let value = match raw.into() {
        RawCell::Missing => return None,
        RawCell::Number(n) => n,
        RawCell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
    };

    value.is_finite().then_some(value)
}

/// Coerces a station number cell; non-integral or non-numeric values are `None`.
pub fn normalize_station_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(id) = trimmed.parse::<i64>() {
        return Some(id);
    }

    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
