//! The untyped record model.

use serde_json::{Map, Value};

/// A metadata record as returned by a source backend.
///
/// Field sets vary per backend and even per record, so records stay untyped:
/// a mapping from field name to a JSON value (string, number, timestamp
/// rendered as a string, or an array of those).
pub type Record = Map<String, Value>;

/// Render a scalar field value as text.
///
/// Strings are returned as-is and numbers are formatted; every other value
/// (null, bool, arrays, objects) yields `None`.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
