//! Per-record audit trail and the sanitized output unit.

use crate::{Record, RedactionAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit detail for one redacted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRedaction {
    pub field_name: String,
    pub action: RedactionAction,
    pub entity_type: String,
    /// Number of detections in the field.
    pub count: usize,
}

/// Audit for one sanitized record.
///
/// Only fields with at least one detection are listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionAudit {
    pub record_id: String,
    pub fields_redacted: Vec<FieldRedaction>,
    pub timestamp: DateTime<Utc>,
}

impl RedactionAudit {
    /// Start an empty audit stamped with the current time.
    pub fn new(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            fields_redacted: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Generate a fresh record identifier.
    ///
    /// Identifiers are random so nothing from the record's own content
    /// reaches the audit trail.
    pub fn generate_record_id() -> String {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        format!("rec-{}", &uuid[..16])
    }

    /// Total number of detections across all fields.
    pub fn total_detections(&self) -> usize {
        self.fields_redacted.iter().map(|f| f.count).sum()
    }

    /// Look up the audit entry for a field.
    pub fn field(&self, name: &str) -> Option<&FieldRedaction> {
        self.fields_redacted.iter().find(|f| f.field_name == name)
    }
}

/// Output unit of the engine: redacted data plus its audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizedRecord {
    /// Same key set and order as the input record.
    pub data: Record,
    pub audit: RedactionAudit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_format() {
        let id = RedactionAudit::generate_record_id();
        assert!(id.starts_with("rec-"));
        assert_eq!(id.len(), 20);
        assert_ne!(id, RedactionAudit::generate_record_id());
    }

    #[test]
    fn test_totals_and_lookup() {
        let mut audit = RedactionAudit::new("rec-1");
        audit.fields_redacted.push(FieldRedaction {
            field_name: "email".into(),
            action: RedactionAction::Mask,
            entity_type: "MASK".into(),
            count: 1,
        });
        audit.fields_redacted.push(FieldRedaction {
            field_name: "notes".into(),
            action: RedactionAction::Redact,
            entity_type: "EMAIL_ADDRESS".into(),
            count: 3,
        });
        assert_eq!(audit.total_detections(), 4);
        assert_eq!(audit.field("notes").map(|f| f.count), Some(3));
        assert!(audit.field("id").is_none());
    }

    #[test]
    fn test_audit_serializes_wire_shape() {
        let audit = RedactionAudit::new("rec-1");
        let value = serde_json::to_value(&audit).unwrap();
        assert_eq!(value["record_id"], "rec-1");
        assert!(value["fields_redacted"].as_array().unwrap().is_empty());
        assert!(value["timestamp"].is_string());
    }
}
