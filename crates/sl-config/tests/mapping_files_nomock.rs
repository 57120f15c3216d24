//! No-mock mapping tests against real files.
//!
//! Covers:
//! - JSON, YAML and TOML mapping files parse to the same config
//! - Policy hash is stable under field reordering and sensitive to edits
//! - Save/parse round trip keeps options

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use sl_common::RedactionAction;
use sl_config::{parse_mapping, MappingConfig, MappingSource, ValidationError};
use std::fs;
use tempfile::TempDir;

const JSON_MAPPING: &str = r#"{
  "version": 1,
  "default_action": "redact",
  "fields": {
    "email": {"action": "mask"},
    "name": {"action": "redact"},
    "id": {"action": "keep", "reason": "surrogate key"}
  }
}"#;

const YAML_MAPPING: &str = r#"
version: 1
default_action: redact
fields:
  id:
    action: keep
    reason: surrogate key
  name:
    action: redact
  email:
    action: mask
"#;

const TOML_MAPPING: &str = r#"
version = 1
default_action = "redact"

[fields.name]
action = "redact"

[fields.id]
action = "keep"
reason = "surrogate key"

[fields.email]
action = "mask"
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write mapping fixture");
    path
}

#[test]
fn test_all_syntaxes_agree() {
    let dir = TempDir::new().unwrap();
    let from_json = parse_mapping(write(&dir, "m.json", JSON_MAPPING)).unwrap();
    let from_yaml = parse_mapping(write(&dir, "m.yaml", YAML_MAPPING)).unwrap();
    let from_toml = parse_mapping(write(&dir, "m.toml", TOML_MAPPING)).unwrap();

    assert_eq!(from_json, from_yaml);
    assert_eq!(from_json, from_toml);
    assert_eq!(from_json.policy_hash(), from_yaml.policy_hash());
    assert_eq!(from_json.policy_hash(), from_toml.policy_hash());
    assert_eq!(from_json.fields["id"].options["reason"], json!("surrogate key"));
}

#[test]
fn test_path_and_value_sources_agree() {
    let dir = TempDir::new().unwrap();
    let from_path = parse_mapping(write(&dir, "m.json", JSON_MAPPING)).unwrap();
    let value: Value = serde_json::from_str(JSON_MAPPING).unwrap();
    let from_value = parse_mapping(MappingSource::Value(value)).unwrap();
    assert_eq!(from_path, from_value);
}

#[test]
fn test_save_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = parse_mapping(write(&dir, "m.json", JSON_MAPPING)).unwrap();
    let saved = dir.path().join("saved.json");
    config.save(&saved).unwrap();
    let reloaded = parse_mapping(saved).unwrap();
    assert_eq!(config, reloaded);
    assert_eq!(config.policy_hash(), reloaded.policy_hash());
}

#[test]
fn test_broken_json_reports_position_only() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "m.json", "{\"version\": 1, \"fields\": {\"ssn\": 123-45-6789}}");
    let err = parse_mapping(path).unwrap_err();
    assert!(matches!(err, ValidationError::ParseError(_)));
    let message = err.to_string();
    assert!(message.contains("line 1"));
    assert!(!message.contains("6789"));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = parse_mapping(std::path::PathBuf::from("/nonexistent/mapping.json")).unwrap_err();
    assert!(matches!(err, ValidationError::IoError { .. }));
}

fn action_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["keep", "mask", "hash", "redact"])
}

proptest! {
    #[test]
    fn prop_policy_hash_stable_under_field_order(
        entries in prop::collection::btree_map("[a-z_]{1,8}", action_strategy(), 1..12),
        seed in any::<u64>(),
    ) {
        let mut forward = Map::new();
        for (name, action) in &entries {
            forward.insert(name.clone(), json!({"action": action}));
        }

        // Deterministic shuffle of insertion order.
        let mut shuffled: Vec<(&String, &&str)> = entries.iter().collect();
        let len = shuffled.len();
        for i in 0..len {
            let j = ((seed.wrapping_add(i as u64 * 7919)) % len as u64) as usize;
            shuffled.swap(i, j);
        }
        let mut permuted = Map::new();
        for (name, action) in shuffled {
            permuted.insert(name.clone(), json!({"action": action}));
        }

        let a = parse_mapping(json!({"version": 1, "fields": Value::Object(forward)})).unwrap();
        let b = parse_mapping(json!({"version": 1, "fields": Value::Object(permuted)})).unwrap();
        prop_assert_eq!(a.policy_hash(), b.policy_hash());
    }

    #[test]
    fn prop_policy_hash_changes_with_any_action(
        entries in prop::collection::btree_map("[a-z_]{1,8}", action_strategy(), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut config = MappingConfig::new();
        for (name, action) in &entries {
            config = config.with_field(
                name.clone(),
                sl_config::FieldMappingEntry::new(RedactionAction::parse_str(action).unwrap()),
            );
        }
        let base = config.policy_hash();

        let names: Vec<String> = config.fields.keys().cloned().collect();
        let target = &names[pick.index(names.len())];
        let current = config.fields[target].action;
        let replacement = sl_common::ALL_ACTIONS
            .into_iter()
            .find(|a| *a != current)
            .unwrap();
        let mut changed = config.clone();
        changed.fields.get_mut(target).unwrap().action = replacement;

        prop_assert_ne!(base, changed.policy_hash());
    }
}
