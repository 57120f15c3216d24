//! Streaming record providers.
//!
//! Each provider lazily yields [`Record`](sl_common::Record)s from one file:
//! - [`JsonlProvider`]: one JSON object per line
//! - [`CsvProvider`]: header row plus string-valued rows
//! - [`ParquetProvider`]: columnar rows decoded one at a time
//!
//! Malformed records surface as [`ReadError`] items carrying a line number
//! and a kind, never the offending text. An optional [`Quarantine`] keeps the
//! same metadata on the side.

pub mod columnar;
pub mod error;
pub mod jsonl;
pub mod provider;
pub mod quarantine;
pub mod registry;
pub mod tabular;

pub use columnar::ParquetProvider;
pub use error::{
    ConnectionError, ConnectionErrorKind, ProviderError, ReadError, ReadErrorKind, Result,
};
pub use jsonl::JsonlProvider;
pub use provider::{RecordProvider, RecordStream, SafeMetadata};
pub use quarantine::{Quarantine, QuarantineEntry};
pub use registry::{ProviderConstructor, ProviderRegistry};
pub use tabular::CsvProvider;
