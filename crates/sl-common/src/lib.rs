//! Shared types for the scrubline sanitization pipeline.
//!
//! This crate holds the data model every stage agrees on:
//! - [`Record`]: one ingested, ordered key/value map
//! - [`Detection`]: a flagged span of sensitive content
//! - [`RedactionAudit`] / [`SanitizedRecord`]: the per-record output
//! - [`RedactionAction`]: the closed set of field actions
//! - [`SourceFormat`]: the record layouts providers can read

pub mod action;
pub mod audit;
pub mod detection;
pub mod format;
pub mod record;

pub use action::{RedactionAction, ALL_ACTIONS};
pub use audit::{FieldRedaction, RedactionAudit, SanitizedRecord};
pub use detection::{Detection, PathSegment};
pub use format::SourceFormat;
pub use record::{canonical_len, canonical_string, field_names, Record};
