//! The provider interface and state shared by every source format.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sl_common::{Record, SourceFormat};
use tracing::debug;

use crate::error::{ConnectionError, ConnectionErrorKind, ReadError};
use crate::quarantine::Quarantine;

/// Lazy, single-pass stream of records from one source.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<Record, ReadError>> + 'a>;

/// Everything a provider reports about its source.
///
/// Paths, sizes and counts only. Nothing derived from record content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeMetadata {
    pub provider_id: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub format: SourceFormat,
    pub records_yielded: u64,
}

/// A source of records.
///
/// Lifecycle: `connect` once, `stream_records`, then `close`. `close` is
/// idempotent and safe before `connect`.
pub trait RecordProvider {
    /// Short provider identifier (`jsonl`, `csv`, `parquet`).
    fn provider_id(&self) -> &'static str;

    fn format(&self) -> SourceFormat;

    /// Open the source, checking it exists, is a regular file and is
    /// readable.
    fn connect(&mut self) -> Result<(), ConnectionError>;

    /// Stream the remaining records. Malformed records surface as `Err`
    /// items and iteration continues unless the error kind is fatal.
    fn stream_records(&mut self) -> Result<RecordStream<'_>, ConnectionError>;

    /// Release the underlying handle.
    fn close(&mut self);

    fn fetch_metadata(&self) -> SafeMetadata;

    /// Attach a quarantine sink for malformed-record metadata.
    fn set_quarantine(&mut self, quarantine: Quarantine);

    /// Detach and return the quarantine sink.
    fn take_quarantine(&mut self) -> Option<Quarantine>;
}

/// Bookkeeping common to all providers.
#[derive(Debug)]
pub(crate) struct SourceState {
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
    pub records_yielded: u64,
    pub quarantine: Option<Quarantine>,
}

impl SourceState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            size_bytes: None,
            records_yielded: 0,
            quarantine: None,
        }
    }

    /// Validate and open the source file.
    pub fn open(&mut self) -> Result<File, ConnectionError> {
        let meta = std::fs::metadata(&self.path)
            .map_err(|e| ConnectionError::new(&self.path, ConnectionErrorKind::from_io(&e)))?;
        if !meta.is_file() {
            return Err(ConnectionError::new(&self.path, ConnectionErrorKind::NotAFile));
        }
        let file = File::open(&self.path)
            .map_err(|e| ConnectionError::new(&self.path, ConnectionErrorKind::from_io(&e)))?;
        self.size_bytes = Some(meta.len());
        debug!(path = %self.path.display(), size_bytes = meta.len(), "Source opened");
        Ok(file)
    }

    pub fn not_connected(&self) -> ConnectionError {
        ConnectionError::new(&self.path, ConnectionErrorKind::NotConnected)
    }

    /// Count a yielded item, quarantining failures.
    pub fn observe(&mut self, item: &Result<Record, ReadError>) {
        match item {
            Ok(_) => self.records_yielded += 1,
            Err(err) => {
                if let Some(q) = self.quarantine.as_mut() {
                    q.record(err);
                }
            }
        }
    }

    pub fn metadata(&self, provider_id: &str, format: SourceFormat) -> SafeMetadata {
        SafeMetadata {
            provider_id: provider_id.to_string(),
            path: self.path.display().to_string(),
            size_bytes: self.size_bytes,
            format,
            records_yielded: self.records_yielded,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
