//! Format to provider lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sl_common::SourceFormat;

use crate::columnar::ParquetProvider;
use crate::error::{ProviderError, Result};
use crate::jsonl::JsonlProvider;
use crate::provider::RecordProvider;
use crate::tabular::CsvProvider;

/// Builds a provider for a source path.
pub type ProviderConstructor = fn(PathBuf) -> Box<dyn RecordProvider>;

/// Explicit registry of provider constructors, passed to whoever needs it.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    constructors: HashMap<SourceFormat, ProviderConstructor>,
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the JSONL, CSV and Parquet providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(SourceFormat::Jsonl, |p| Box::new(JsonlProvider::new(p)));
        registry.register(SourceFormat::Csv, |p| Box::new(CsvProvider::new(p)));
        registry.register(SourceFormat::Parquet, |p| Box::new(ParquetProvider::new(p)));
        registry
    }

    /// Register (or replace) the constructor for a format.
    pub fn register(&mut self, format: SourceFormat, constructor: ProviderConstructor) {
        self.constructors.insert(format, constructor);
    }

    pub fn supports(&self, format: SourceFormat) -> bool {
        self.constructors.contains_key(&format)
    }

    /// Registered formats, sorted by name.
    pub fn formats(&self) -> Vec<SourceFormat> {
        let mut formats: Vec<SourceFormat> = self.constructors.keys().copied().collect();
        formats.sort_by_key(|f| f.as_str());
        formats
    }

    /// Create an unconnected provider for `format`.
    pub fn create(&self, format: SourceFormat, path: impl Into<PathBuf>) -> Result<Box<dyn RecordProvider>> {
        let constructor = self
            .constructors
            .get(&format)
            .ok_or_else(|| ProviderError::UnsupportedFormat(format.to_string()))?;
        Ok(constructor(path.into()))
    }

    /// Create a provider, inferring the format from the extension unless
    /// `format` is given.
    pub fn create_for_path(
        &self,
        path: &Path,
        format: Option<SourceFormat>,
    ) -> Result<Box<dyn RecordProvider>> {
        let format = match format {
            Some(f) => f,
            None => SourceFormat::from_path(path)
                .ok_or_else(|| ProviderError::UnknownFormat(path.display().to_string()))?,
        };
        self.create(format, path)
    }
}
