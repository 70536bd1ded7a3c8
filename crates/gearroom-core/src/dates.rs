//! Canonical date-time strings.
//!
//! Bookings store their start/end times and item stamps as strings in one
//! canonical UTC form. Raw spreadsheet cells are normalized into that form
//! on the way in, and the lifecycle rules parse it back when they need to do
//! arithmetic.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::coerce::to_loose_string;

/// Format used for every stored date-time string.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Naive layouts accepted on input, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Render an instant in the canonical form.
#[must_use]
pub fn format_date_time(instant: DateTime<Utc>) -> String {
    instant.format(CANONICAL_FORMAT).to_string()
}

/// Parse a stored or raw date-time string.
///
/// Accepts RFC 3339 (any offset), the naive layouts above, and bare dates
/// (midnight). Returns `None` for anything else, including blank text.
#[must_use]
pub fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Normalize a raw spreadsheet cell into the canonical form.
///
/// Numeric cells are epoch milliseconds. Text that parses is reformatted;
/// text that does not is kept as-is so nothing is silently dropped.
#[must_use]
pub fn normalize_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Number(n) => n
            .as_f64()
            .and_then(|millis| DateTime::from_timestamp_millis(millis as i64))
            .map_or_else(|| n.to_string(), format_date_time),
        Value::String(s) => parse_date_time(s).map_or_else(|| s.clone(), format_date_time),
        other => to_loose_string(other),
    }
}
