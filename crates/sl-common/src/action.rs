//! Redaction actions.

use serde::{Deserialize, Serialize};

/// Action to apply to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionAction {
    /// Pass the value through unchanged
    Keep,
    /// Keep a recognizable outline (`j***@example.com`, `a***z`)
    Mask,
    /// Replace with a truncated SHA-256 digest
    Hash,
    /// Replace entirely with a `[FIELD_REDACTED]` placeholder
    Redact,
}

/// All actions, in the order they are documented.
pub const ALL_ACTIONS: [RedactionAction; 4] = [
    RedactionAction::Redact,
    RedactionAction::Mask,
    RedactionAction::Hash,
    RedactionAction::Keep,
];

impl RedactionAction {
    /// Parse an action name. Surrounding whitespace and case are ignored.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "keep" => Some(RedactionAction::Keep),
            "mask" => Some(RedactionAction::Mask),
            "hash" => Some(RedactionAction::Hash),
            "redact" => Some(RedactionAction::Redact),
            _ => None,
        }
    }

    /// Lowercase action name as it appears in mapping files.
    pub fn as_str(&self) -> &'static str {
        match self {
            RedactionAction::Keep => "keep",
            RedactionAction::Mask => "mask",
            RedactionAction::Hash => "hash",
            RedactionAction::Redact => "redact",
        }
    }

    /// Entity type emitted by policy-driven detection for this action.
    pub fn entity_type(&self) -> &'static str {
        match self {
            RedactionAction::Keep => "KEEP",
            RedactionAction::Mask => "MASK",
            RedactionAction::Hash => "HASH",
            RedactionAction::Redact => "REDACT",
        }
    }

    /// Action recorded in the audit trail for a detection entity type.
    ///
    /// Content-derived entity types (`EMAIL_ADDRESS`, `SENSITIVE_KEY`, ...)
    /// are replaced by placeholders, so they are audited as `redact`.
    pub fn for_entity_type(entity_type: &str) -> Self {
        match entity_type {
            "KEEP" => RedactionAction::Keep,
            "MASK" => RedactionAction::Mask,
            "HASH" => RedactionAction::Hash,
            _ => RedactionAction::Redact,
        }
    }

    /// Returns whether this action modifies the value.
    pub fn is_modifying(&self) -> bool {
        !matches!(self, RedactionAction::Keep)
    }
}

impl std::fmt::Display for RedactionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for RedactionAction {
    fn default() -> Self {
        RedactionAction::Redact // Fail-closed default
    }
}
