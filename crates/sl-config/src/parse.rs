//! Mapping parser.
//!
//! Accepts a mapping file (JSON, YAML or TOML, chosen by extension) or an
//! already-deserialized JSON document and fails fast on the first
//! structural problem.

use serde_json::{Map, Value};
use sl_common::RedactionAction;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::mapping::{FieldMappingEntry, MappingConfig, SUPPORTED_VERSIONS};
use crate::validate::{ValidationError, ValidationResult};

/// Where a mapping comes from.
#[derive(Debug, Clone)]
pub enum MappingSource {
    /// A mapping file on disk.
    Path(PathBuf),
    /// An in-memory document with the mapping schema.
    Value(Value),
}

impl From<&Path> for MappingSource {
    fn from(path: &Path) -> Self {
        MappingSource::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for MappingSource {
    fn from(path: PathBuf) -> Self {
        MappingSource::Path(path)
    }
}

impl From<Value> for MappingSource {
    fn from(value: Value) -> Self {
        MappingSource::Value(value)
    }
}

/// Parse and validate a mapping.
pub fn parse_mapping(source: impl Into<MappingSource>) -> ValidationResult<MappingConfig> {
    match source.into() {
        MappingSource::Path(path) => {
            let document = load_document(&path)?;
            let config = mapping_from_value(&document)?;
            debug!(
                path = %path.display(),
                fields = config.fields.len(),
                "Mapping loaded"
            );
            Ok(config)
        }
        MappingSource::Value(document) => mapping_from_value(&document),
    }
}

/// Read a mapping document, picking the syntax from the file extension.
///
/// Unknown extensions are read as JSON.
pub fn load_document(path: &Path) -> ValidationResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ValidationError::IoError {
        path: path.display().to_string(),
        kind: e.kind().to_string(),
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    // Parser messages can quote the offending input, so only positions are kept.
    match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str::<Value>(&content).map_err(|e| {
            let at = e
                .location()
                .map(|l| format!(" at line {} column {}", l.line(), l.column()))
                .unwrap_or_default();
            ValidationError::ParseError(format!("mapping is not valid YAML{}", at))
        }),
        "toml" => toml::from_str::<Value>(&content).map_err(|e| {
            let at = e
                .span()
                .map(|s| format!(" at byte offset {}", s.start))
                .unwrap_or_default();
            ValidationError::ParseError(format!("mapping is not valid TOML{}", at))
        }),
        _ => serde_json::from_str::<Value>(&content).map_err(|e| {
            ValidationError::ParseError(format!(
                "mapping is not valid JSON at line {} column {}",
                e.line(),
                e.column()
            ))
        }),
    }
}

/// Validate a mapping document and build the typed config.
pub fn mapping_from_value(document: &Value) -> ValidationResult<MappingConfig> {
    let root = document
        .as_object()
        .ok_or_else(|| ValidationError::invalid("mapping", "must be an object"))?;

    let version = parse_version(root)?;
    let default_action = parse_default_action(root)?;
    let fields = parse_fields(root)?;

    Ok(MappingConfig {
        version,
        default_action,
        fields,
    })
}

fn parse_version(root: &Map<String, Value>) -> ValidationResult<u64> {
    let raw = root
        .get("version")
        .ok_or_else(|| ValidationError::MissingField("version".to_string()))?;

    // YAML and TOML writers may emit `1.0`; integral floats count as integers.
    let version = raw
        .as_u64()
        .or_else(|| {
            raw.as_f64()
                .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
                .map(|v| v as u64)
        })
        .ok_or_else(|| ValidationError::invalid("version", "must be a non-negative integer"))?;

    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ValidationError::UnsupportedVersion {
            version: version.to_string(),
            supported: SUPPORTED_VERSIONS
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    Ok(version)
}

fn parse_default_action(root: &Map<String, Value>) -> ValidationResult<RedactionAction> {
    match root.get("default_action") {
        None | Some(Value::Null) => Ok(RedactionAction::default()),
        Some(Value::String(s)) => RedactionAction::parse_str(s).ok_or_else(|| {
            ValidationError::invalid(
                "default_action",
                "unknown action; expected one of redact, mask, hash, keep",
            )
        }),
        Some(_) => Err(ValidationError::invalid("default_action", "must be a string")),
    }
}

fn parse_fields(
    root: &Map<String, Value>,
) -> ValidationResult<BTreeMap<String, FieldMappingEntry>> {
    let raw = root
        .get("fields")
        .ok_or_else(|| ValidationError::MissingField("fields".to_string()))?;

    let entries = raw
        .as_object()
        .ok_or_else(|| ValidationError::invalid("fields", "must be an object"))?;

    if entries.is_empty() {
        return Err(ValidationError::invalid(
            "fields",
            "must contain at least one field mapping",
        ));
    }

    let mut fields = BTreeMap::new();
    for (name, entry) in entries {
        fields.insert(name.clone(), parse_field_entry(name, entry)?);
    }
    Ok(fields)
}

fn parse_field_entry(name: &str, entry: &Value) -> ValidationResult<FieldMappingEntry> {
    let obj = entry.as_object().ok_or_else(|| {
        ValidationError::invalid(
            format!("fields.{}", name),
            "must be an object with an 'action' key",
        )
    })?;

    let action = match obj.get("action") {
        None => {
            return Err(ValidationError::MissingField(format!(
                "fields.{}.action",
                name
            )))
        }
        Some(Value::String(s)) => RedactionAction::parse_str(s).ok_or_else(|| {
            ValidationError::invalid(
                format!("fields.{}.action", name),
                "unknown action; expected one of redact, mask, hash, keep",
            )
        })?,
        Some(_) => {
            return Err(ValidationError::invalid(
                format!("fields.{}.action", name),
                "must be a string",
            ))
        }
    };

    let options: Map<String, Value> = obj
        .iter()
        .filter(|(key, _)| key.as_str() != "action")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(FieldMappingEntry { action, options })
}
