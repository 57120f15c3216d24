//! Error types for detection and redaction.

use thiserror::Error;

/// Result type for strategy operations.
pub type Result<T> = std::result::Result<T, StrategyError>;

/// Errors raised while scanning a field.
///
/// Variants carry structural context (field and entity names, recognizer
/// identity, error kinds) and never the scanned content.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// The entity recognizer failed on one value.
    #[error("recognizer '{recognizer}' failed: {kind}")]
    Recognizer { recognizer: String, kind: String },

    /// A recognizer returned a span outside the scanned text or off a
    /// character boundary.
    #[error("recognizer '{recognizer}' returned an invalid {entity_type} span")]
    InvalidDetection {
        recognizer: String,
        entity_type: String,
    },
}

impl StrategyError {
    /// Short machine-readable kind, safe for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyError::Recognizer { .. } => "recognizer_failed",
            StrategyError::InvalidDetection { .. } => "invalid_detection",
        }
    }
}

/// Errors reported by an entity recognizer backend.
#[derive(Error, Debug)]
pub enum RecognizerError {
    /// The backend cannot be loaded in this environment.
    #[error("entity recognizer '{0}' is unavailable")]
    Unavailable(String),

    /// The backend failed while analyzing one value.
    #[error("entity recognizer failed: {0}")]
    Failed(String),
}
