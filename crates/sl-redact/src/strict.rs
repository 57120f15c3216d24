//! Policy-driven strategy.
//!
//! Every field gets exactly the action its mapping names. Fields the
//! mapping does not name get `default_action`, which is `redact` unless the
//! mapping says otherwise.

use serde_json::Value;
use sl_common::{canonical_len, canonical_string, Detection, RedactionAction};
use sl_config::MappingConfig;

use crate::transform::{hash_value, mask_value, redact_placeholder};

/// Strategy that applies mapped field actions.
#[derive(Debug, Clone)]
pub struct StrictStrategy {
    mapping: MappingConfig,
}

impl StrictStrategy {
    pub fn new(mapping: MappingConfig) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &MappingConfig {
        &self.mapping
    }

    /// One whole-value detection named after the field's action, or none
    /// for `keep`.
    pub fn scan_value(&self, field_name: &str, value: &Value) -> Vec<Detection> {
        let action = self.mapping.action_for(field_name);
        if action == RedactionAction::Keep {
            return Vec::new();
        }
        vec![Detection::whole(action.entity_type(), canonical_len(value))]
    }

    /// Apply the action encoded in the first detection.
    ///
    /// With no detections the value is returned as-is; an entity type this
    /// strategy does not produce also leaves the value untouched.
    pub fn redact(&self, field_name: &str, value: &Value, detections: &[Detection]) -> Value {
        let Some(first) = detections.first() else {
            return value.clone();
        };
        match transform_for(field_name, &first.entity_type, &canonical_string(value)) {
            Some(out) => Value::String(out),
            None => value.clone(),
        }
    }

    /// String form of [`StrictStrategy::redact`].
    pub fn redact_str(&self, field_name: &str, text: &str, detections: &[Detection]) -> String {
        detections
            .first()
            .and_then(|first| transform_for(field_name, &first.entity_type, text))
            .unwrap_or_else(|| text.to_string())
    }
}

fn transform_for(field_name: &str, entity_type: &str, text: &str) -> Option<String> {
    match entity_type {
        "REDACT" => Some(redact_placeholder(field_name)),
        "MASK" => Some(mask_value(text)),
        "HASH" => Some(hash_value(text)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sl_config::FieldMappingEntry;

    fn strategy() -> StrictStrategy {
        StrictStrategy::new(
            MappingConfig::new()
                .with_field("email", FieldMappingEntry::new(RedactionAction::Mask))
                .with_field("name", FieldMappingEntry::new(RedactionAction::Redact))
                .with_field("card", FieldMappingEntry::new(RedactionAction::Hash))
                .with_field("id", FieldMappingEntry::new(RedactionAction::Keep)),
        )
    }

    fn run(field: &str, value: Value) -> Value {
        let s = strategy();
        let detections = s.scan_value(field, &value);
        s.redact(field, &value, &detections)
    }

    #[test]
    fn test_scan_shapes() {
        let s = strategy();
        assert!(s.scan_value("id", &json!("7")).is_empty());

        let d = s.scan_value("email", &json!("john@example.com"));
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].entity_type, "MASK");
        assert_eq!((d[0].start, d[0].end, d[0].score), (0, 16, 1.0));

        let d = s.scan_value("ssn", &json!("123-45-6789"));
        assert_eq!(d[0].entity_type, "REDACT");
        assert_eq!(d[0].end, 11);
    }

    #[test]
    fn test_non_string_values_use_canonical_length() {
        let d = strategy().scan_value("card", &json!(4111111111111111u64));
        assert_eq!(d[0].end, 16);
        let d = strategy().scan_value("name", &json!({"first": "Jo"}));
        assert_eq!(d[0].end, r#"{"first":"Jo"}"#.len());
    }

    #[test]
    fn test_actions() {
        assert_eq!(run("email", json!("john@example.com")), json!("j***@example.com"));
        assert_eq!(run("name", json!("John Doe")), json!("[NAME_REDACTED]"));
        assert_eq!(run("id", json!("7")), json!("7"));
        assert_eq!(run("id", json!(7)), json!(7));
        assert_eq!(run("ssn", json!("123-45-6789")), json!("[SSN_REDACTED]"));
        assert_eq!(run("ssn", json!("")), json!("[SSN_REDACTED]"));
        let hashed = run("card", json!("4111111111111111"));
        assert!(hashed.as_str().unwrap().starts_with("hash_"));
    }

    #[test]
    fn test_keep_default_passes_unmapped_fields() {
        let s = StrictStrategy::new(
            MappingConfig::new()
                .with_default_action(RedactionAction::Keep)
                .with_field("name", FieldMappingEntry::new(RedactionAction::Redact)),
        );
        assert!(s.scan_value("note", &json!("hello")).is_empty());
    }

    #[test]
    fn test_unknown_entity_type_is_passthrough() {
        let s = strategy();
        let d = vec![Detection::whole("TOKENIZE", 5)];
        assert_eq!(s.redact("name", &json!("hello"), &d), json!("hello"));
        assert_eq!(s.redact_str("name", "hello", &d), "hello");
    }

    #[test]
    fn test_redact_str_matches_redact() {
        let s = strategy();
        let d = s.scan_value("email", &json!("a@b.c"));
        assert_eq!(s.redact_str("email", "a@b.c", &d), "a***@b.c");
        assert_eq!(s.redact_str("email", "a@b.c", &[]), "a@b.c");
    }
}
