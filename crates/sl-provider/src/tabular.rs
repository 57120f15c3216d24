//! Delimited-text provider.
//!
//! The header row supplies the keys; every row becomes a record of string
//! values in header order. `.tsv` sources are read tab-delimited.

use std::fs::File;
use std::path::PathBuf;

use serde_json::Value;
use sl_common::{Record, SourceFormat};
use tracing::debug;

use crate::error::{ConnectionError, ConnectionErrorKind, ReadError, ReadErrorKind};
use crate::provider::{RecordProvider, RecordStream, SafeMetadata, SourceState};
use crate::quarantine::Quarantine;

/// Reads CSV (or TSV) with a header row.
pub struct CsvProvider {
    state: SourceState,
    delimiter: u8,
    headers: Vec<String>,
    rows: Option<csv::StringRecordsIntoIter<File>>,
    last_line: u64,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
        Self {
            state: SourceState::new(path),
            delimiter: if is_tsv { b'\t' } else { b',' },
            headers: Vec::new(),
            rows: None,
            last_line: 0,
        }
    }

    /// Override the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Column names, available after `connect`.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl RecordProvider for CsvProvider {
    fn provider_id(&self) -> &'static str {
        "csv"
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::Csv
    }

    fn connect(&mut self) -> Result<(), ConnectionError> {
        let file = self.state.open()?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(file);

        self.headers = reader
            .headers()
            .map_err(|_| ConnectionError::new(self.state.path(), ConnectionErrorKind::Unreadable))?
            .iter()
            .map(str::to_string)
            .collect();
        self.last_line = 1;
        self.rows = Some(reader.into_records());
        debug!(columns = self.headers.len(), "CSV header read");
        Ok(())
    }

    fn stream_records(&mut self) -> Result<RecordStream<'_>, ConnectionError> {
        let Some(rows) = self.rows.as_mut() else {
            return Err(self.state.not_connected());
        };
        Ok(Box::new(CsvStream {
            rows,
            headers: &self.headers,
            state: &mut self.state,
            last_line: &mut self.last_line,
            done: false,
        }))
    }

    fn close(&mut self) {
        if self.rows.take().is_some() {
            debug!(path = %self.state.path().display(), "Source closed");
        }
    }

    fn fetch_metadata(&self) -> SafeMetadata {
        self.state.metadata(self.provider_id(), self.format())
    }

    fn set_quarantine(&mut self, quarantine: Quarantine) {
        self.state.quarantine = Some(quarantine);
    }

    fn take_quarantine(&mut self) -> Option<Quarantine> {
        self.state.quarantine.take()
    }
}

struct CsvStream<'a> {
    rows: &'a mut csv::StringRecordsIntoIter<File>,
    headers: &'a [String],
    state: &'a mut SourceState,
    last_line: &'a mut u64,
    done: bool,
}

impl CsvStream<'_> {
    fn convert(&mut self, result: csv::Result<csv::StringRecord>) -> Result<Record, ReadError> {
        match result {
            Ok(row) => {
                if let Some(pos) = row.position() {
                    *self.last_line = pos.line();
                }
                let mut record = Record::new();
                for (key, value) in self.headers.iter().zip(row.iter()) {
                    record.insert(key.clone(), Value::String(value.to_string()));
                }
                Ok(record)
            }
            Err(err) => {
                let line = err
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(*self.last_line + 1);
                *self.last_line = line;
                let kind = match err.kind() {
                    csv::ErrorKind::Utf8 { .. } => ReadErrorKind::InvalidUtf8,
                    csv::ErrorKind::Io(_) => {
                        self.done = true;
                        ReadErrorKind::Io
                    }
                    _ => ReadErrorKind::MalformedRow,
                };
                Err(ReadError::new(line, self.state.path(), kind))
            }
        }
    }
}

impl Iterator for CsvStream<'_> {
    type Item = Result<Record, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.rows.next()?;
        let item = self.convert(result);
        self.state.observe(&item);
        Some(item)
    }
}
