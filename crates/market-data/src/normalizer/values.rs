//! Lenient numeric reads from provider JSON.
//!
//! Providers send numbers either as JSON numbers or as numeric strings, and
//! use `null` for "not supplied".

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Read a value as a decimal.
pub(crate) fn as_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().replace(',', ""),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Read a value as a finite float.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// First alias present in `object` with a decimal value.
pub(crate) fn first_decimal<'a>(
    object: &Map<String, Value>,
    aliases: &[&'a str],
) -> Option<(&'a str, Decimal)> {
    aliases
        .iter()
        .find_map(|alias| object.get(*alias).and_then(as_decimal).map(|v| (*alias, v)))
}
