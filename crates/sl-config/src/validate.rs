//! Mapping validation errors and record/mapping compatibility checks.
//!
//! Error messages name fields and structural problems only. Values taken
//! from sample records or rejected option values are never echoed.

use serde::Serialize;
use sl_common::Record;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::MappingConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Mapping validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error reading {path}: {kind}")]
    IoError { path: String, kind: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Unsupported mapping version {version} (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError { .. } => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::MissingField(_) => 64,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::UnsupportedVersion { .. } => 66,
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of comparing a mapping with the fields of a sample record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    /// Fields present in both the mapping and the record.
    pub matched: Vec<String>,
    /// Record fields the mapping does not name; they get `default_action`.
    pub unmapped: Vec<String>,
    /// Mapping fields absent from the record.
    pub missing: Vec<String>,
    /// True when no mapped field is missing from the record.
    pub is_valid: bool,
}

/// Compare a mapping against the field names of one record.
///
/// Extra record fields are tolerated (they fall back to the default action
/// at processing time); only mapped-but-missing fields make the report
/// invalid.
pub fn validate_against_record(config: &MappingConfig, record: &Record) -> SchemaReport {
    let mapping_fields: BTreeSet<&str> = config.fields.keys().map(String::as_str).collect();
    let record_fields: BTreeSet<&str> = record.keys().map(String::as_str).collect();

    let matched: Vec<String> = mapping_fields
        .intersection(&record_fields)
        .map(|s| s.to_string())
        .collect();
    let unmapped: Vec<String> = record_fields
        .difference(&mapping_fields)
        .map(|s| s.to_string())
        .collect();
    let missing: Vec<String> = mapping_fields
        .difference(&record_fields)
        .map(|s| s.to_string())
        .collect();

    let is_valid = missing.is_empty();
    SchemaReport {
        matched,
        unmapped,
        missing,
        is_valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::mapping_from_value;
    use serde_json::json;

    fn config() -> MappingConfig {
        mapping_from_value(&json!({
            "version": 1,
            "fields": {
                "email": {"action": "mask"},
                "name": {"action": "redact"},
                "id": {"action": "keep"}
            }
        }))
        .unwrap()
    }

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_exact_match_is_valid() {
        let report = validate_against_record(
            &config(),
            &record(json!({"id": "7", "name": "x", "email": "y"})),
        );
        assert_eq!(report.matched, vec!["email", "id", "name"]);
        assert!(report.unmapped.is_empty());
        assert!(report.missing.is_empty());
        assert!(report.is_valid);
    }

    #[test]
    fn test_extra_fields_are_tolerated() {
        let report = validate_against_record(
            &config(),
            &record(json!({"id": "7", "name": "x", "email": "y", "ssn": "z", "age": 3})),
        );
        assert_eq!(report.unmapped, vec!["age", "ssn"]);
        assert!(report.is_valid);
    }

    #[test]
    fn test_missing_fields_invalidate() {
        let report = validate_against_record(&config(), &record(json!({"id": "7"})));
        assert_eq!(report.matched, vec!["id"]);
        assert_eq!(report.missing, vec!["email", "name"]);
        assert!(!report.is_valid);
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ValidationError::MissingField("version".into()).code(), 64);
        assert_eq!(
            ValidationError::UnsupportedVersion {
                version: "2".into(),
                supported: "1".into()
            }
            .code(),
            66
        );
    }
}
