//! Pipeline settings.
//!
//! Settings come from an optional TOML/JSON file, then environment
//! overrides, then explicit CLI values. Defaults are fail-closed: strict
//! strategy, skip-and-count on bad records, audit trail on.

use serde::{Deserialize, Serialize};
use sl_common::SourceFormat;
use std::path::{Path, PathBuf};

use crate::validate::{ValidationError, ValidationResult};

/// Environment variable overriding the strategy.
pub const ENV_STRATEGY: &str = "SCRUBLINE_STRATEGY";
/// Environment variable overriding the error policy.
pub const ENV_ON_ERROR: &str = "SCRUBLINE_ON_ERROR";

/// Which detection/redaction strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Field-level actions taken from the mapping
    #[default]
    Strict,
    /// Content inspection of every leaf string
    Deep,
}

impl StrategyKind {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" | "policy" => Some(StrategyKind::Strict),
            "deep" | "inspect" => Some(StrategyKind::Deep),
            _ => None,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Strict => write!(f, "strict"),
            StrategyKind::Deep => write!(f, "deep"),
        }
    }
}

/// What the engine does when one record cannot be sanitized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorPolicy {
    /// Drop the record, count it, log structurally and continue
    #[default]
    SkipRecord,
    /// Stop the stream at the first failing record
    AbortStream,
}

impl ErrorPolicy {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" | "skip_record" | "skip-record" => Some(ErrorPolicy::SkipRecord),
            "abort" | "abort_stream" | "abort-stream" => Some(ErrorPolicy::AbortStream),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorPolicy::SkipRecord => write!(f, "SKIP_RECORD"),
            ErrorPolicy::AbortStream => write!(f, "ABORT_STREAM"),
        }
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default)]
    pub strategy: StrategyKind,

    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Force an input format instead of inferring it from the extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_format: Option<SourceFormat>,

    /// Append-only JSONL file for malformed-record metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarantine_path: Option<PathBuf>,

    /// Write the audit trail next to the output.
    #[serde(default = "default_true")]
    pub audit_enabled: bool,

    /// Audit JSONL location; `<output>.audit.jsonl` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            error_policy: ErrorPolicy::default(),
            input_format: None,
            quarantine_path: None,
            audit_enabled: true,
            audit_path: None,
        }
    }
}

impl PipelineSettings {
    /// Load settings from a TOML or JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ValidationResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ValidationError::IoError {
            path: path.display().to_string(),
            kind: e.kind().to_string(),
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content).map_err(|e| {
                ValidationError::ParseError(format!(
                    "settings are not valid JSON at line {} column {}",
                    e.line(),
                    e.column()
                ))
            })
        } else {
            toml::from_str(&content).map_err(|e| {
                ValidationError::ParseError(format!("settings are not valid TOML: {}", e.message()))
            })
        }
    }

    /// Apply `SCRUBLINE_STRATEGY` / `SCRUBLINE_ON_ERROR`.
    ///
    /// Unrecognized values are rejected rather than silently ignored.
    pub fn apply_env(&mut self) -> ValidationResult<()> {
        if let Ok(val) = std::env::var(ENV_STRATEGY) {
            self.strategy = StrategyKind::parse_str(&val)
                .ok_or_else(|| ValidationError::invalid(ENV_STRATEGY, "expected strict or deep"))?;
        }
        if let Ok(val) = std::env::var(ENV_ON_ERROR) {
            self.error_policy = ErrorPolicy::parse_str(&val)
                .ok_or_else(|| ValidationError::invalid(ENV_ON_ERROR, "expected skip or abort"))?;
        }
        Ok(())
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_input_format(mut self, format: SourceFormat) -> Self {
        self.input_format = Some(format);
        self
    }

    pub fn with_quarantine_path(mut self, path: PathBuf) -> Self {
        self.quarantine_path = Some(path);
        self
    }

    pub fn with_audit_path(mut self, path: PathBuf) -> Self {
        self.audit_path = Some(path);
        self
    }

    /// Audit file for `output`, or `None` when auditing is off.
    pub fn audit_path_for(&self, output: &Path) -> Option<PathBuf> {
        if !self.audit_enabled {
            return None;
        }
        Some(self.audit_path.clone().unwrap_or_else(|| {
            let mut name = output.file_name().unwrap_or_default().to_os_string();
            name.push(".audit.jsonl");
            output.with_file_name(name)
        }))
    }
}
