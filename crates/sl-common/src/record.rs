//! Ingested records and their canonical string form.

use serde_json::Value;

/// One ingested unit: an ordered, string-keyed map of JSON values.
///
/// Key order follows the source (serde_json is built with `preserve_order`).
pub type Record = serde_json::Map<String, Value>;

/// Canonical string form of a value.
///
/// Detection offsets and masking/hashing all operate on this form:
/// strings are used as-is, every other value is rendered as compact JSON
/// (`null`, `true`, `42`, `{"a":1}`).
pub fn canonical_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Byte length of the canonical string form without building it for strings.
pub fn canonical_len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.len(),
        other => other.to_string().len(),
    }
}

/// Sorted key names of a record.
pub fn field_names(record: &Record) -> Vec<String> {
    let mut names: Vec<String> = record.keys().cloned().collect();
    names.sort();
    names
}
