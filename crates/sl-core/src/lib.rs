//! scrubline core: the streaming sanitization engine.
//!
//! Ties the workspace together:
//! - [`engine`]: per-record scan, redact and audit under an error policy
//! - [`writer`]: per-record flushed JSONL output with atomic completion
//! - [`pipeline`]: provider → engine → writer for one input file
//! - [`logging`]: stderr logging, human or JSON lines
//!
//! Memory use is independent of input size: one record is in flight at a
//! time and the engine keeps counters only.

pub mod engine;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod pipeline;
pub mod writer;

pub use engine::{policy_hash_for, EngineStats, SanitizationEngine, SanitizedStream};
pub use error::{PipelineError, RecordFailure, RecordSanitizationError, WriteError};
pub use exit_codes::ExitCode;
pub use pipeline::{Pipeline, RunSummary};
pub use writer::{RecordWriter, WriteSummary};
