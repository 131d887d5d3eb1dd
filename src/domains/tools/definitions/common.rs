//! Common utilities shared across tool definitions.

use serde_json::Value;

/// Separator between formatted alerts and forecast periods.
pub const RECORD_SEPARATOR: &str = "\n---\n";

/// Render a JSON value as display text: strings unquoted, numbers and
/// booleans as written, `null` and containers as `None`.
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Display text of `object[key]`, or `default` when missing or not a scalar.
pub fn field_or(object: &Value, key: &str, default: &str) -> String {
    object
        .get(key)
        .and_then(display_value)
        .unwrap_or_else(|| default.to_string())
}

/// Display text of `object[key]` when present.
pub fn field(object: &Value, key: &str) -> Option<String> {
    object.get(key).and_then(display_value)
}
