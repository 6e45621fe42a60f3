//! Lenient decoding of monetary values coming back from the backend.
//!
//! The backend is not consistent about money: the same field can arrive as a
//! JSON number, a numeric string, an empty string or `null`. Anything that is
//! not a finite number decodes to "no value" instead of failing the whole
//! payload.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interprets a JSON value as a decimal amount.
///
/// Returns `None` for anything that is not a number or a numeric string.
#[must_use]
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// `deserialize_with` helper for optional amounts (discount values, minimums).
///
/// # Errors
///
/// Only fails when the input is not valid JSON at all.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

/// `deserialize_with` helper for required amounts; unreadable input becomes zero.
///
/// # Errors
///
/// Only fails when the input is not valid JSON at all.
pub fn lenient_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_decimal(deserializer)?.unwrap_or(Decimal::ZERO))
}
