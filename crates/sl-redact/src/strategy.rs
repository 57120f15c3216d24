//! The closed set of sanitization strategies.

use serde_json::{json, Value};
use sl_common::Detection;
use sl_config::{MappingConfig, StrategyKind};

use crate::deep::DeepStrategy;
use crate::error::Result;
use crate::patterns::{curated_entity_types, SENSITIVE_KEY_PATTERN};
use crate::strict::StrictStrategy;

/// A detection and redaction strategy, selected once per run.
#[derive(Debug)]
pub enum Strategy {
    /// Mapping-driven, whole-field actions.
    Strict(StrictStrategy),
    /// Content-inspecting, span-level redaction.
    Deep(DeepStrategy),
}

impl Strategy {
    /// Build the strategy named by `kind`.
    ///
    /// The mapping drives `strict`; `deep` inspects content and ignores it.
    pub fn from_kind(kind: StrategyKind, mapping: MappingConfig) -> Self {
        match kind {
            StrategyKind::Strict => Strategy::Strict(StrictStrategy::new(mapping)),
            StrategyKind::Deep => Strategy::Deep(DeepStrategy::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Strict(_) => "strict",
            Strategy::Deep(_) => "deep",
        }
    }

    /// Everything that changes what this strategy emits, as JSON.
    pub fn fingerprint(&self) -> Value {
        match self {
            Strategy::Strict(s) => s.mapping().fingerprint(),
            Strategy::Deep(d) => json!({
                "recognizer": d.recognizer_name(),
                "curated_entity_types": curated_entity_types(),
                "sensitive_key_pattern": SENSITIVE_KEY_PATTERN,
            }),
        }
    }

    /// Detect sensitive content in one field value.
    pub fn scan_value(&self, field_name: &str, value: &Value) -> Result<Vec<Detection>> {
        match self {
            Strategy::Strict(s) => Ok(s.scan_value(field_name, value)),
            Strategy::Deep(d) => d.scan_value(field_name, value),
        }
    }

    /// Produce the sanitized value for `detections`.
    pub fn redact(&self, field_name: &str, value: &Value, detections: &[Detection]) -> Value {
        match self {
            Strategy::Strict(s) => s.redact(field_name, value, detections),
            Strategy::Deep(d) => d.redact(value, detections),
        }
    }
}

impl From<StrictStrategy> for Strategy {
    fn from(s: StrictStrategy) -> Self {
        Strategy::Strict(s)
    }
}

impl From<DeepStrategy> for Strategy {
    fn from(d: DeepStrategy) -> Self {
        Strategy::Deep(d)
    }
}
