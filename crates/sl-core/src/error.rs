//! Error types for the engine, writer and pipeline.
//!
//! Variants carry indexes, field names, paths and kinds. None of them holds
//! a record value.

use std::path::PathBuf;

use sl_config::ValidationError;
use sl_provider::{ConnectionError, ProviderError, ReadError};
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Why one record could not be sanitized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordFailure {
    /// The provider could not decode the record.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// The strategy failed while scanning a field.
    #[error("scanning field '{field}' failed: {kind}")]
    Scan { field: String, kind: &'static str },

    /// A detection did not fit the value it was computed on.
    #[error("field '{field}' has an invalid {entity_type} span [{start}, {end})")]
    InvalidDetection {
        field: String,
        entity_type: String,
        start: usize,
        end: usize,
    },
}

impl RecordFailure {
    /// Short failure kind for logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordFailure::Read(e) => e.kind.as_str(),
            RecordFailure::Scan { kind, .. } => *kind,
            RecordFailure::InvalidDetection { .. } => "invalid_detection",
        }
    }
}

impl From<std::convert::Infallible> for RecordFailure {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// A record failed and the stream was aborted.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("record {index} failed: {cause}")]
pub struct RecordSanitizationError {
    /// Zero-based position in the input stream.
    pub index: u64,
    pub cause: RecordFailure,
}

impl RecordSanitizationError {
    pub fn code(&self) -> u32 {
        40
    }
}

/// Errors writing sanitized output.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("cannot write '{}': {kind}", path.display())]
    Io { path: PathBuf, kind: std::io::ErrorKind },

    #[error("cannot serialize output line: {0}")]
    Serialize(String),
}

impl WriteError {
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        WriteError::Io {
            path: path.to_path_buf(),
            kind: err.kind(),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            WriteError::Io { .. } => 50,
            WriteError::Serialize(_) => 51,
        }
    }
}

/// Top-level errors from a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("stream aborted: {0}")]
    Aborted(#[from] RecordSanitizationError),

    #[error("no mapping file found (pass --mapping or set SCRUBLINE_MAPPING)")]
    MappingNotFound,
}

impl From<ConnectionError> for PipelineError {
    fn from(err: ConnectionError) -> Self {
        PipelineError::Provider(err.into())
    }
}

impl PipelineError {
    pub fn code(&self) -> u32 {
        match self {
            PipelineError::Config(e) => e.code(),
            PipelineError::Provider(e) => e.code(),
            PipelineError::Write(e) => e.code(),
            PipelineError::Aborted(e) => e.code(),
            PipelineError::MappingNotFound => 67,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            PipelineError::Config(_) | PipelineError::MappingNotFound => ExitCode::ConfigError,
            PipelineError::Provider(ProviderError::UnsupportedFormat(_))
            | PipelineError::Provider(ProviderError::UnknownFormat(_)) => ExitCode::ConfigError,
            PipelineError::Provider(_) | PipelineError::Write(_) => ExitCode::IoError,
            PipelineError::Aborted(_) => ExitCode::Aborted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_provider::{ConnectionErrorKind, ReadErrorKind};

    #[test]
    fn test_exit_codes() {
        let err: PipelineError = ConnectionError::new("/x", ConnectionErrorKind::NotFound).into();
        assert_eq!(err.exit_code(), ExitCode::IoError);
        assert_eq!(err.code(), 30);

        let err: PipelineError = ValidationError::MissingField("version".into()).into();
        assert_eq!(err.exit_code(), ExitCode::ConfigError);

        let err: PipelineError = RecordSanitizationError {
            index: 3,
            cause: ReadError::new(4, "/in.jsonl", ReadErrorKind::InvalidJson).into(),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::Aborted);
        assert_eq!(
            err.to_string(),
            "stream aborted: record 3 failed: malformed record at line 4 of '/in.jsonl': invalid_json"
        );
    }

    #[test]
    fn test_failure_kinds() {
        let scan = RecordFailure::Scan {
            field: "notes".into(),
            kind: "recognizer_failed",
        };
        assert_eq!(scan.kind(), "recognizer_failed");
        let read: RecordFailure = ReadError::new(1, "/in.csv", ReadErrorKind::MalformedRow).into();
        assert_eq!(read.kind(), "malformed_row");
    }
}
