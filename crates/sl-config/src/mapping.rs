//! Field mapping policy.
//!
//! A mapping assigns one [`RedactionAction`] to each named field, plus a
//! default for fields it does not name. Parsed mappings are immutable; the
//! policy hash fingerprints everything that affects output.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use sl_common::RedactionAction;
use std::collections::BTreeMap;
use std::path::Path;

use crate::validate::{ValidationError, ValidationResult};

/// Mapping schema versions this build understands.
pub const SUPPORTED_VERSIONS: &[u64] = &[1];

/// Version written by [`MappingConfig::new`].
pub const CURRENT_VERSION: u64 = 1;

/// Action and free-form options for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMappingEntry {
    pub action: RedactionAction,

    /// Every key of the entry other than `action`, preserved verbatim.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl FieldMappingEntry {
    /// Create an entry with no options.
    pub fn new(action: RedactionAction) -> Self {
        Self {
            action,
            options: Map::new(),
        }
    }

    /// Add an option.
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Validated field → action configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub version: u64,

    /// Action for fields not listed in `fields`.
    #[serde(default)]
    pub default_action: RedactionAction,

    pub fields: BTreeMap<String, FieldMappingEntry>,
}

impl MappingConfig {
    /// Create a current-version mapping with the fail-closed default.
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            default_action: RedactionAction::default(),
            fields: BTreeMap::new(),
        }
    }

    /// Add or replace a field entry.
    pub fn with_field(mut self, name: impl Into<String>, entry: FieldMappingEntry) -> Self {
        self.fields.insert(name.into(), entry);
        self
    }

    /// Set the default action.
    pub fn with_default_action(mut self, action: RedactionAction) -> Self {
        self.default_action = action;
        self
    }

    /// Action for a field, falling back to `default_action`.
    pub fn action_for(&self, field: &str) -> RedactionAction {
        self.fields
            .get(field)
            .map(|entry| entry.action)
            .unwrap_or(self.default_action)
    }

    /// Returns whether the field is explicitly mapped.
    pub fn is_mapped(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Canonical description of everything that affects redaction output.
    ///
    /// Object keys are sorted at every depth, so the result does not depend
    /// on the order fields or options were declared in.
    pub fn fingerprint(&self) -> Value {
        let fields: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, entry)| {
                (
                    name.clone(),
                    json!({
                        "action": entry.action.as_str(),
                        "options": Value::Object(entry.options.clone()),
                    }),
                )
            })
            .collect();

        canonical_json(&json!({
            "default_action": self.default_action.as_str(),
            "fields": Value::Object(fields),
        }))
    }

    /// Deterministic SHA-256 fingerprint of the mapping (hex).
    pub fn policy_hash(&self) -> String {
        sha256_hex(self.fingerprint().to_string().as_bytes())
    }

    /// Serialize to pretty JSON in the mapping file schema.
    pub fn to_json(&self) -> ValidationResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("cannot serialize mapping: {}", e)))
    }

    /// Save to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ValidationResult<()> {
        let path = path.as_ref();
        let content = self.to_json()?;
        std::fs::write(path, content).map_err(|e| ValidationError::IoError {
            path: path.display().to_string(),
            kind: e.kind().to_string(),
        })
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuild a JSON value with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonical_json(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_json).collect()),
        other => other.clone(),
    }
}

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
