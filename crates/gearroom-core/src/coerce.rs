//! Loose coercion of spreadsheet and stored JSON values into typed fields.
//!
//! Cells coming from a spreadsheet (and records that were round-tripped
//! through storage) are not reliably typed: a barcode may arrive as a number,
//! a checkbox as a boolean or as text. These helpers apply one consistent set
//! of rules so that both construction paths produce the same record.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// Get the cell at `index`, or `null` when the row is too short.
#[must_use]
pub fn cell(row: &[Value], index: usize) -> &Value {
    row.get(index).unwrap_or(&NULL)
}

/// Get the value stored under `key`, or `null` when it is absent.
#[must_use]
pub fn field<'a>(record: &'a Map<String, Value>, key: &str) -> &'a Value {
    record.get(key).unwrap_or(&NULL)
}

/// Render a value as a plain string.
///
/// `null` renders as the empty string. Integral numbers render without a
/// fractional part, so a barcode cell holding `10050.0` becomes `"10050"`.
#[must_use]
pub fn to_loose_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return n.to_string();
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                    format!("{}", f as i64)
                }
                Some(f) => f.to_string(),
                None => n.to_string(),
            }
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Whether a value counts as "set".
///
/// Empty strings, `false`, zero and `null` are unset; everything else is set.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric reading of a value, if it has one.
///
/// Blank strings read as zero; text that is not a number has no value.
#[must_use]
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse trimmed text as a number. Blank text is zero.
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|f| !f.is_nan())
}

/// Item quantity: at least one, defaulting to one when absent or unusable.
#[must_use]
pub fn to_quantity(value: &Value) -> u32 {
    if !is_truthy(value) {
        return 1;
    }
    match to_number(value) {
        Some(q) if q.is_finite() && q >= 1.0 => q.min(f64::from(u32::MAX)).floor() as u32,
        _ => 1,
    }
}

/// Serde adapter for [`to_loose_string`].
pub fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| to_loose_string(&v))
}

/// Serde adapter for [`is_truthy`].
pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| is_truthy(&v))
}
