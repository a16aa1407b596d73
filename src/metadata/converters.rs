//! Stock save/retrieve converters.

use std::sync::Arc;

use serde_json::Value;

use super::table::Converter;

/// Converts between a `BIT(1)` column and a boolean property.
///
/// On retrieve, `1`, `"1"`, `"\u{1}"` and `true` become `true`; `0`, `"0"`,
/// `"\u{0}"` and `false` become `false`. On save, booleans become `1`/`0`.
/// Null and anything unrecognised pass through unchanged.
pub fn bit() -> Converter {
    Converter::new()
        .on_retrieve(Arc::new(|value: &Value| match value {
            Value::Number(n) if n.as_u64() == Some(1) => Value::Bool(true),
            Value::Number(n) if n.as_u64() == Some(0) => Value::Bool(false),
            Value::String(s) if s == "1" || s == "\u{1}" => Value::Bool(true),
            Value::String(s) if s == "0" || s == "\u{0}" => Value::Bool(false),
            other => other.clone(),
        }))
        .on_save(Arc::new(|value: &Value| match value {
            Value::Bool(true) => Value::from(1),
            Value::Bool(false) => Value::from(0),
            other => other.clone(),
        }))
}

/// Converts between a `'Y'`/`'N'` column and a boolean property.
pub fn yes_no() -> Converter {
    Converter::new()
        .on_retrieve(Arc::new(|value: &Value| match value {
            Value::String(s) if s.eq_ignore_ascii_case("y") => Value::Bool(true),
            Value::String(s) if s.eq_ignore_ascii_case("n") => Value::Bool(false),
            other => other.clone(),
        }))
        .on_save(Arc::new(|value: &Value| match value {
            Value::Bool(true) => Value::from("Y"),
            Value::Bool(false) => Value::from("N"),
            other => other.clone(),
        }))
}
