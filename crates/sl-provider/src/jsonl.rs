//! Line-delimited JSON provider.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use serde_json::Value;
use sl_common::{Record, SourceFormat};
use tracing::debug;

use crate::error::{ConnectionError, ReadError, ReadErrorKind};
use crate::provider::{RecordProvider, RecordStream, SafeMetadata, SourceState};
use crate::quarantine::Quarantine;

/// Reads one JSON object per line. Blank lines are skipped.
#[derive(Debug)]
pub struct JsonlProvider {
    state: SourceState,
    reader: Option<BufReader<File>>,
    line_number: u64,
}

impl JsonlProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            state: SourceState::new(path.into()),
            reader: None,
            line_number: 0,
        }
    }
}

impl RecordProvider for JsonlProvider {
    fn provider_id(&self) -> &'static str {
        "jsonl"
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::Jsonl
    }

    fn connect(&mut self) -> Result<(), ConnectionError> {
        let file = self.state.open()?;
        self.reader = Some(BufReader::new(file));
        self.line_number = 0;
        Ok(())
    }

    fn stream_records(&mut self) -> Result<RecordStream<'_>, ConnectionError> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(self.state.not_connected());
        };
        Ok(Box::new(JsonlStream {
            reader,
            state: &mut self.state,
            line_number: &mut self.line_number,
            buf: Vec::new(),
            done: false,
        }))
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(path = %self.state.path().display(), lines = self.line_number, "Source closed");
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

struct JsonlStream<'a> {
    reader: &'a mut BufReader<File>,
    state: &'a mut SourceState,
    line_number: &'a mut u64,
    buf: Vec<u8>,
    done: bool,
}

impl JsonlStream<'_> {
    fn error(&self, kind: ReadErrorKind) -> ReadError {
        ReadError::new(*self.line_number, self.state.path(), kind)
    }

    fn read_next(&mut self) -> Option<Result<Record, ReadError>> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => *self.line_number += 1,
                Err(_) => {
                    self.done = true;
                    *self.line_number += 1;
                    return Some(Err(self.error(ReadErrorKind::Io)));
                }
            }

            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            if std::str::from_utf8(&self.buf).is_err() {
                return Some(Err(self.error(ReadErrorKind::InvalidUtf8)));
            }

            return Some(match serde_json::from_slice::<Value>(&self.buf) {
                Ok(Value::Object(record)) => Ok(record),
                Ok(_) => Err(self.error(ReadErrorKind::NotAnObject)),
                Err(_) => Err(self.error(ReadErrorKind::InvalidJson)),
            });
        }
    }
}

impl Iterator for JsonlStream<'_> {
    type Item = Result<Record, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.read_next()?;
        self.state.observe(&item);
        Some(item)
    }
}
