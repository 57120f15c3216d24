//! Mapping policy and pipeline configuration for scrubline.
//!
//! This crate provides:
//! - The field → action mapping ([`MappingConfig`]) and its policy hash
//! - A fail-fast parser for JSON/YAML/TOML mapping files
//! - Record/mapping compatibility checks
//! - Pipeline settings and mapping path resolution

pub mod mapping;
pub mod parse;
pub mod resolve;
pub mod settings;
pub mod validate;

pub use mapping::{
    canonical_json, sha256_hex, FieldMappingEntry, MappingConfig, CURRENT_VERSION,
    SUPPORTED_VERSIONS,
};
pub use parse::{load_document, mapping_from_value, parse_mapping, MappingSource};
pub use resolve::{resolve_mapping_path, ConfigSource, MappingLocation};
pub use settings::{ErrorPolicy, PipelineSettings, StrategyKind};
pub use validate::{validate_against_record, SchemaReport, ValidationError, ValidationResult};
