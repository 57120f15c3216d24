//! Streaming sanitization engine.
//!
//! The engine pulls one record at a time from its input, runs the strategy
//! over every field and hands the sanitized record on before pulling the
//! next. It keeps three counters and nothing else from the records it has
//! seen.

use std::convert::Infallible;

use serde::Serialize;
use serde_json::json;
use sl_common::{canonical_string, FieldRedaction, Record, RedactionAction, RedactionAudit, SanitizedRecord};
use sl_config::{canonical_json, sha256_hex, ErrorPolicy};
use sl_redact::Strategy;
use tracing::{error, info, trace, warn};

use crate::error::{RecordFailure, RecordSanitizationError};

/// Counters, each bumped once per input record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub processed: u64,
    pub sanitized: u64,
    pub failed: u64,
}

/// Composes a strategy and an error policy over a record stream.
#[derive(Debug)]
pub struct SanitizationEngine {
    strategy: Strategy,
    error_policy: ErrorPolicy,
    policy_hash: String,
    stats: EngineStats,
}

impl SanitizationEngine {
    pub fn new(strategy: Strategy, error_policy: ErrorPolicy) -> Self {
        let policy_hash = policy_hash_for(&strategy);
        info!(
            strategy = strategy.name(),
            error_policy = %error_policy,
            policy_hash = %policy_hash,
            "Sanitization engine ready"
        );
        Self {
            strategy,
            error_policy,
            policy_hash,
            stats: EngineStats::default(),
        }
    }

    /// SHA-256 over the strategy name and fingerprint, computed once.
    pub fn policy_hash(&self) -> &str {
        &self.policy_hash
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn reset_counters(&mut self) {
        self.stats = EngineStats::default();
    }

    /// Sanitize one record without touching the counters.
    pub fn sanitize_record(&self, record: &Record) -> Result<SanitizedRecord, RecordFailure> {
        let mut data = Record::new();
        let mut audit = RedactionAudit::new(RedactionAudit::generate_record_id());

        for (field, value) in record {
            let detections = self
                .strategy
                .scan_value(field, value)
                .map_err(|e| RecordFailure::Scan {
                    field: field.clone(),
                    kind: e.kind(),
                })?;

            let Some(first) = detections.first() else {
                data.insert(field.clone(), value.clone());
                continue;
            };

            let canonical = canonical_string(value);
            if let Some(bad) = detections
                .iter()
                .find(|d| d.path.is_empty() && !d.is_valid_for(&canonical))
            {
                return Err(RecordFailure::InvalidDetection {
                    field: field.clone(),
                    entity_type: bad.entity_type.clone(),
                    start: bad.start,
                    end: bad.end,
                });
            }

            data.insert(field.clone(), self.strategy.redact(field, value, &detections));
            audit.fields_redacted.push(FieldRedaction {
                field_name: field.clone(),
                action: RedactionAction::for_entity_type(&first.entity_type),
                entity_type: first.entity_type.clone(),
                count: detections.len(),
            });
        }

        trace!(
            record_id = %audit.record_id,
            fields = data.len(),
            redacted = audit.fields_redacted.len(),
            "Record sanitized"
        );
        Ok(SanitizedRecord { data, audit })
    }

    /// Lazily sanitize a stream of records, possibly failed ones.
    ///
    /// Failed records are counted; under skip-record they are dropped with a
    /// structural warning, under abort-stream the first one is yielded as an
    /// error and the stream ends without pulling more input.
    pub fn process_stream<I, E>(&mut self, input: I) -> SanitizedStream<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Result<Record, E>>,
        E: Into<RecordFailure>,
    {
        SanitizedStream {
            engine: self,
            input: input.into_iter(),
            index: 0,
            halted: false,
        }
    }

    /// [`process_stream`](Self::process_stream) over records that cannot
    /// fail to read.
    pub fn process_records<I>(
        &mut self,
        records: I,
    ) -> SanitizedStream<'_, InfallibleRecords<I::IntoIter>>
    where
        I: IntoIterator<Item = Record>,
    {
        let lift: fn(Record) -> Result<Record, Infallible> = Ok;
        self.process_stream(records.into_iter().map(lift))
    }
}

/// Plain records lifted into the fallible stream shape.
pub type InfallibleRecords<I> = std::iter::Map<I, fn(Record) -> Result<Record, Infallible>>;

/// Policy hash of a strategy: SHA-256 over its name and fingerprint in
/// canonical JSON.
pub fn policy_hash_for(strategy: &Strategy) -> String {
    let descriptor = json!({
        "strategy": strategy.name(),
        "fingerprint": strategy.fingerprint(),
    });
    sha256_hex(canonical_json(&descriptor).to_string().as_bytes())
}

/// Iterator returned by [`SanitizationEngine::process_stream`].
pub struct SanitizedStream<'a, I> {
    engine: &'a mut SanitizationEngine,
    input: I,
    index: u64,
    halted: bool,
}

impl<I, E> Iterator for SanitizedStream<'_, I>
where
    I: Iterator<Item = Result<Record, E>>,
    E: Into<RecordFailure>,
{
    type Item = Result<SanitizedRecord, RecordSanitizationError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.halted {
                return None;
            }
            let item = self.input.next()?;
            let index = self.index;
            self.index += 1;
            self.engine.stats.processed += 1;

            let cause = match item.map_err(Into::into) {
                Ok(record) => match self.engine.sanitize_record(&record) {
                    Ok(sanitized) => {
                        self.engine.stats.sanitized += 1;
                        return Some(Ok(sanitized));
                    }
                    Err(cause) => cause,
                },
                Err(cause) => cause,
            };

            self.engine.stats.failed += 1;
            match self.engine.error_policy {
                ErrorPolicy::SkipRecord => {
                    warn!(index, kind = cause.kind(), "Skipping record that failed sanitization");
                }
                ErrorPolicy::AbortStream => {
                    error!(index, kind = cause.kind(), "Aborting stream on failed record");
                    self.halted = true;
                    return Some(Err(RecordSanitizationError { index, cause }));
                }
            }
        }
    }
}
