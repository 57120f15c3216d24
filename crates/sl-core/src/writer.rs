//! JSONL writer for sanitized output.
//!
//! Data lines go to a temporary file next to the output and are flushed one
//! record at a time. `finish` renames the temporary file into place, so the
//! output path only ever holds complete output. Audits go to their own file
//! the same way.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sl_common::SanitizedRecord;
use tracing::debug;

use crate::error::WriteError;

/// Line counts and final paths of a finished writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub records: u64,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<PathBuf>,
}

/// One JSONL file written through a temporary sibling.
#[derive(Debug)]
struct AtomicJsonl {
    final_path: PathBuf,
    temp_path: PathBuf,
    writer: BufWriter<File>,
    lines: u64,
}

impl AtomicJsonl {
    fn create(final_path: &Path) -> Result<Self, WriteError> {
        let temp_path = temp_path_for(final_path);
        let file = File::create(&temp_path).map_err(|e| WriteError::io(&temp_path, e))?;
        Ok(Self {
            final_path: final_path.to_path_buf(),
            temp_path,
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<(), WriteError> {
        // Serialization errors name the failing type, never the value.
        serde_json::to_writer(&mut self.writer, value).map_err(|e| {
            if e.is_io() {
                WriteError::Io {
                    path: self.temp_path.clone(),
                    kind: std::io::Error::from(e).kind(),
                }
            } else {
                WriteError::Serialize(format!("{:?}", e.classify()))
            }
        })?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .map_err(|e| WriteError::io(&self.temp_path, e))?;
        self.lines += 1;
        Ok(())
    }

    fn commit(mut self) -> Result<(PathBuf, u64), WriteError> {
        self.writer
            .flush()
            .and_then(|_| self.writer.get_ref().sync_all())
            .map_err(|e| WriteError::io(&self.temp_path, e))?;
        fs::rename(&self.temp_path, &self.final_path)
            .map_err(|e| WriteError::io(&self.final_path, e))?;
        debug!(path = %self.final_path.display(), lines = self.lines, "Output committed");
        Ok((self.final_path, self.lines))
    }
}

/// `dir/.name.<random>.partial`
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let tag = uuid::Uuid::new_v4().simple().to_string();
    path.with_file_name(format!(".{}.{}.partial", name, &tag[..8]))
}

/// Writes sanitized records (and optionally their audits) as JSONL.
///
/// Dropping a writer without calling [`finish`](Self::finish) leaves the
/// temporary files in place for inspection.
#[derive(Debug)]
pub struct RecordWriter {
    data: AtomicJsonl,
    audit: Option<AtomicJsonl>,
}

impl RecordWriter {
    pub fn create(output: &Path) -> Result<Self, WriteError> {
        Ok(Self {
            data: AtomicJsonl::create(output)?,
            audit: None,
        })
    }

    /// Also write each record's audit to `path`.
    pub fn with_audit(mut self, path: &Path) -> Result<Self, WriteError> {
        self.audit = Some(AtomicJsonl::create(path)?);
        Ok(self)
    }

    /// Write one record's data line (and audit line), flushing both.
    pub fn write(&mut self, record: &SanitizedRecord) -> Result<(), WriteError> {
        self.data.write_line(&record.data)?;
        if let Some(audit) = self.audit.as_mut() {
            audit.write_line(&record.audit)?;
        }
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.data.lines
    }

    /// Temporary data file currently being written.
    pub fn temp_path(&self) -> &Path {
        &self.data.temp_path
    }

    /// Move the output (and audit) into place.
    pub fn finish(self) -> Result<WriteSummary, WriteError> {
        let (output, records) = self.data.commit()?;
        let audit = match self.audit {
            Some(audit) => Some(audit.commit()?.0),
            None => None,
        };
        Ok(WriteSummary {
            records,
            output,
            audit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sl_common::{FieldRedaction, RedactionAction, RedactionAudit};
    use tempfile::TempDir;

    fn sample(n: i64) -> SanitizedRecord {
        let mut audit = RedactionAudit::new(format!("rec-{:016}", n));
        audit.fields_redacted.push(FieldRedaction {
            field_name: "name".into(),
            action: RedactionAction::Redact,
            entity_type: "REDACT".into(),
            count: 1,
        });
        let data = match json!({"id": n, "name": "[NAME_REDACTED]"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        SanitizedRecord { data, audit }
    }

    #[test]
    fn test_output_appears_only_on_finish() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("clean.jsonl");
        let audit = dir.path().join("clean.audit.jsonl");

        let mut writer = RecordWriter::create(&output).unwrap().with_audit(&audit).unwrap();
        writer.write(&sample(1)).unwrap();
        writer.write(&sample(2)).unwrap();
        assert!(!output.exists());

        // Flushed per record: the temp file already holds both lines.
        let partial = fs::read_to_string(writer.temp_path()).unwrap();
        assert_eq!(partial.lines().count(), 2);

        let summary = writer.finish().unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.audit.as_deref(), Some(audit.as_path()));

        let lines: Vec<serde_json::Value> = fs::read_to_string(&output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[1], json!({"id": 2, "name": "[NAME_REDACTED]"}));

        let audits: Vec<RedactionAudit> = fs::read_to_string(&audit)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(audits[0].fields_redacted[0].field_name, "name");

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".partial"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_unfinished_writer_leaves_output_untouched() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("clean.jsonl");
        fs::write(&output, "previous complete run\n").unwrap();

        let mut writer = RecordWriter::create(&output).unwrap();
        writer.write(&sample(1)).unwrap();
        let temp = writer.temp_path().to_path_buf();
        drop(writer);

        assert_eq!(fs::read_to_string(&output).unwrap(), "previous complete run\n");
        assert!(temp.exists());
    }

    #[test]
    fn test_missing_directory() {
        let err = RecordWriter::create(Path::new("/nonexistent-dir/out.jsonl")).unwrap_err();
        assert_eq!(err.code(), 50);
    }
}
