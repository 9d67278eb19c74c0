//! Field helpers shared by the mapping profiles.

use serde_json::Value;

use crate::errors::MappingError;
use centralsearch_shared::{text_value, Record};

/// Read `field` as a non-empty scalar string.
pub fn required_text(record: &Record, field: &str) -> Result<String, MappingError> {
    let value = record
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| MappingError::missing(field))?;

    match text_value(value) {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(MappingError::missing(field)),
        None => Err(MappingError::invalid(field, "expected a string or number")),
    }
}

/// Single-space list used by some indexes to mark an empty field.
pub fn is_placeholder(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.len() == 1 && items[0] == Value::String(" ".into()))
}

/// Copy the fields named in `renames` (source, target) into a new record.
/// Absent fields are skipped, as are placeholder values when
/// `skip_placeholders` is set.
pub fn keep_renamed(record: &Record, renames: &[(&str, &str)], skip_placeholders: bool) -> Record {
    let mut output = Record::new();
    for (from, to) in renames {
        if let Some(value) = record.get(*from) {
            if skip_placeholders && is_placeholder(value) {
                continue;
            }
            output.insert((*to).to_string(), value.clone());
        }
    }
    output
}

/// A value as a list: arrays are returned as-is, scalars wrapped.
pub fn as_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Replace `field` with its list form if present.
pub fn listify(record: &mut Record, field: &str) {
    if let Some(value) = record.get_mut(field) {
        if !value.is_array() {
            *value = Value::Array(vec![value.take()]);
        }
    }
}

/// Concatenate the list values of `fields`, in order, skipping absent ones.
pub fn concat_lists(record: &Record, fields: &[&str]) -> Vec<Value> {
    fields
        .iter()
        .filter_map(|field| record.get(*field))
        .flat_map(as_list)
        .collect()
}
