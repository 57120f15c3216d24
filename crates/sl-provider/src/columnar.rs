//! Columnar provider.
//!
//! Rows are decoded one at a time through the row iterator, which reads a
//! single row group at a time, and converted to JSON objects.

use std::fs::File;
use std::path::PathBuf;

use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::reader::RowIter;
use serde_json::Value;
use sl_common::{Record, SourceFormat};
use tracing::debug;

use crate::error::{ConnectionError, ConnectionErrorKind, ReadError, ReadErrorKind};
use crate::provider::{RecordProvider, RecordStream, SafeMetadata, SourceState};
use crate::quarantine::Quarantine;

/// Reads Apache Parquet files row by row.
pub struct ParquetProvider {
    state: SourceState,
    rows: Option<RowIter<'static>>,
    row_number: u64,
    total_rows: Option<i64>,
}

impl ParquetProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            state: SourceState::new(path.into()),
            rows: None,
            row_number: 0,
            total_rows: None,
        }
    }

    /// Row count from the file footer, available after `connect`.
    pub fn total_rows(&self) -> Option<i64> {
        self.total_rows
    }
}

impl RecordProvider for ParquetProvider {
    fn provider_id(&self) -> &'static str {
        "parquet"
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::Parquet
    }

    fn connect(&mut self) -> Result<(), ConnectionError> {
        let file = self.state.open()?;
        let reader = SerializedFileReader::new(file)
            .map_err(|_| ConnectionError::new(self.state.path(), ConnectionErrorKind::Unreadable))?;
        let total = reader.metadata().file_metadata().num_rows();
        debug!(
            row_groups = reader.metadata().num_row_groups(),
            rows = total,
            "Parquet footer read"
        );
        self.total_rows = Some(total);
        self.row_number = 0;
        self.rows = Some(reader.into_iter());
        Ok(())
    }

    fn stream_records(&mut self) -> Result<RecordStream<'_>, ConnectionError> {
        let Some(rows) = self.rows.as_mut() else {
            return Err(self.state.not_connected());
        };
        Ok(Box::new(ParquetStream {
            rows,
            state: &mut self.state,
            row_number: &mut self.row_number,
            done: false,
        }))
    }

    fn close(&mut self) {
        if self.rows.take().is_some() {
            debug!(path = %self.state.path().display(), rows = self.row_number, "Source closed");
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

struct ParquetStream<'a> {
    rows: &'a mut RowIter<'static>,
    state: &'a mut SourceState,
    row_number: &'a mut u64,
    done: bool,
}

impl Iterator for ParquetStream<'_> {
    type Item = Result<Record, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.rows.next()?;
        *self.row_number += 1;

        let item = match result {
            Ok(row) => match row.to_json_value() {
                Value::Object(record) => Ok(record),
                _ => Err(ReadError::new(*self.row_number, self.state.path(), ReadErrorKind::NotAnObject)),
            },
            // Decode failures end the stream.
            Err(_) => {
                self.done = true;
                Err(ReadError::new(*self.row_number, self.state.path(), ReadErrorKind::Decode))
            }
        };
        self.state.observe(&item);
        Some(item)
    }
}
