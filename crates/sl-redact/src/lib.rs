//! Detection and redaction strategies.
//!
//! Two strategies share one interface (`scan_value` then `redact`):
//! - [`StrictStrategy`] applies the mapping's action to every field
//! - [`DeepStrategy`] inspects content, nested structures included
//!
//! Errors carry structural context only. Nothing in this crate logs or
//! returns the content it scans.

pub mod deep;
pub mod error;
pub mod patterns;
pub mod recognizer;
pub mod strategy;
pub mod strict;
pub mod transform;

pub use deep::{DeepStrategy, REGEX_ONLY};
pub use error::{RecognizerError, Result, StrategyError};
pub use patterns::{curated_entity_types, is_sensitive_key, scan_curated, SENSITIVE_KEY};
pub use recognizer::{default_factory, luhn_valid, EntityRecognizer, PatternRecognizer, RecognizerFactory};
pub use strategy::Strategy;
pub use strict::StrictStrategy;
pub use transform::{entity_placeholder, hash_value, mask_value, redact_placeholder, replace_spans};
