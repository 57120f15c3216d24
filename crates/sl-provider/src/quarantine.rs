//! Side channel for malformed records.
//!
//! Each entry holds position metadata only: line number, error kind,
//! timestamp and the source file. The record text is never kept.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ProviderError, ReadError, Result};

/// Metadata about one malformed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantineEntry {
    pub line_number: u64,
    pub error_type: String,
    pub timestamp: DateTime<Utc>,
    pub source_file: String,
}

impl QuarantineEntry {
    pub fn from_error(err: &ReadError) -> Self {
        Self {
            line_number: err.line_number,
            error_type: err.kind.as_str().to_string(),
            timestamp: Utc::now(),
            source_file: err.source_path.display().to_string(),
        }
    }
}

/// Where quarantine entries go.
#[derive(Debug)]
pub enum Quarantine {
    /// Kept in memory; mostly for tests and short runs.
    Memory(Vec<QuarantineEntry>),
    /// Appended as JSONL, flushed per entry.
    File {
        path: PathBuf,
        writer: BufWriter<File>,
        written: u64,
    },
}

impl Quarantine {
    pub fn memory() -> Self {
        Quarantine::Memory(Vec::new())
    }

    /// Open (or create) an append-only quarantine file.
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ProviderError::Quarantine {
                path: path.display().to_string(),
                kind: e.kind().to_string(),
            })?;
        Ok(Quarantine::File {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Record one malformed record.
    ///
    /// A failing quarantine file is logged and otherwise ignored; it must
    /// not stop the main stream.
    pub fn record(&mut self, err: &ReadError) {
        let entry = QuarantineEntry::from_error(err);
        match self {
            Quarantine::Memory(entries) => entries.push(entry),
            Quarantine::File {
                path,
                writer,
                written,
            } => {
                let result = serde_json::to_writer(&mut *writer, &entry)
                    .map_err(std::io::Error::from)
                    .and_then(|_| writer.write_all(b"\n"))
                    .and_then(|_| writer.flush());
                match result {
                    Ok(()) => *written += 1,
                    Err(e) => warn!(
                        path = %path.display(),
                        error = %e.kind(),
                        "Failed to append quarantine entry"
                    ),
                }
            }
        }
    }

    /// Entries held in memory (empty for file sinks).
    pub fn entries(&self) -> &[QuarantineEntry] {
        match self {
            Quarantine::Memory(entries) => entries,
            Quarantine::File { .. } => &[],
        }
    }

    /// Number of entries recorded by this sink.
    pub fn len(&self) -> u64 {
        match self {
            Quarantine::Memory(entries) => entries.len() as u64,
            Quarantine::File { written, .. } => *written,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
