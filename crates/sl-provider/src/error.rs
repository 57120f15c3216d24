//! Error types for record providers.
//!
//! Errors name the source path, a line or row number and a kind. They never
//! carry the text that failed to parse.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a source could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    NotFound,
    NotAFile,
    PermissionDenied,
    Unreadable,
    /// `stream_records` was called before `connect`.
    NotConnected,
}

impl ConnectionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionErrorKind::NotFound => "not_found",
            ConnectionErrorKind::NotAFile => "not_a_file",
            ConnectionErrorKind::PermissionDenied => "permission_denied",
            ConnectionErrorKind::Unreadable => "unreadable",
            ConnectionErrorKind::NotConnected => "not_connected",
        }
    }

    pub(crate) fn from_io(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ConnectionErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => ConnectionErrorKind::PermissionDenied,
            _ => ConnectionErrorKind::Unreadable,
        }
    }
}

impl fmt::Display for ConnectionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The source could not be opened. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot open source '{}': {kind}", path.display())]
pub struct ConnectionError {
    pub path: PathBuf,
    pub kind: ConnectionErrorKind,
}

impl ConnectionError {
    pub fn new(path: impl Into<PathBuf>, kind: ConnectionErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn code(&self) -> u32 {
        30
    }
}

/// Why one record could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadErrorKind {
    /// Not parseable as JSON
    InvalidJson,
    /// Parsed, but not a JSON object
    NotAnObject,
    /// Line bytes are not UTF-8
    InvalidUtf8,
    /// Row shape does not match the header
    MalformedRow,
    /// Columnar row could not be decoded
    Decode,
    /// Underlying read failed; the stream ends here
    Io,
}

impl ReadErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadErrorKind::InvalidJson => "invalid_json",
            ReadErrorKind::NotAnObject => "not_an_object",
            ReadErrorKind::InvalidUtf8 => "invalid_utf8",
            ReadErrorKind::MalformedRow => "malformed_row",
            ReadErrorKind::Decode => "decode_failed",
            ReadErrorKind::Io => "io_error",
        }
    }

    /// Whether the stream can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ReadErrorKind::Io | ReadErrorKind::Decode)
    }
}

impl fmt::Display for ReadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One malformed record. Line numbers are 1-based (rows for Parquet).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed record at line {line_number} of '{}': {kind}", source_path.display())]
pub struct ReadError {
    pub line_number: u64,
    pub source_path: PathBuf,
    pub kind: ReadErrorKind,
}

impl ReadError {
    pub fn new(line_number: u64, source_path: impl Into<PathBuf>, kind: ReadErrorKind) -> Self {
        Self {
            line_number,
            source_path: source_path.into(),
            kind,
        }
    }

    pub fn code(&self) -> u32 {
        31
    }
}

/// Errors from provider construction and lookup.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Read(#[from] ReadError),

    /// No provider is registered for the format.
    #[error("no provider registered for format '{0}'")]
    UnsupportedFormat(String),

    /// The format could not be inferred from the path.
    #[error("cannot infer input format from '{0}'")]
    UnknownFormat(String),

    /// The quarantine file could not be opened.
    #[error("cannot open quarantine file '{path}': {kind}")]
    Quarantine { path: String, kind: String },
}

impl ProviderError {
    pub fn code(&self) -> u32 {
        match self {
            ProviderError::Connection(e) => e.code(),
            ProviderError::Read(e) => e.code(),
            ProviderError::UnsupportedFormat(_) => 32,
            ProviderError::UnknownFormat(_) => 33,
            ProviderError::Quarantine { .. } => 34,
        }
    }
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_structural() {
        let err = ReadError::new(7, "/data/in.jsonl", ReadErrorKind::InvalidJson);
        assert_eq!(
            err.to_string(),
            "malformed record at line 7 of '/data/in.jsonl': invalid_json"
        );
        let err = ConnectionError::new("/nope", ConnectionErrorKind::NotFound);
        assert_eq!(err.to_string(), "cannot open source '/nope': not_found");
    }

    #[test]
    fn test_codes() {
        let conn: ProviderError = ConnectionError::new("/x", ConnectionErrorKind::NotAFile).into();
        assert_eq!(conn.code(), 30);
        assert_eq!(ProviderError::UnsupportedFormat("xml".into()).code(), 32);
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(ReadErrorKind::InvalidJson.is_recoverable());
        assert!(ReadErrorKind::MalformedRow.is_recoverable());
        assert!(!ReadErrorKind::Io.is_recoverable());
    }
}
