//! Source formats understood by the providers.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Physical layout of a record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Line-delimited JSON objects
    Jsonl,
    /// Comma-separated values with a header row
    Csv,
    /// Apache Parquet
    Parquet,
}

impl SourceFormat {
    /// Parse a format name.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "jsonl" | "ndjson" | "json" => Some(SourceFormat::Jsonl),
            "csv" | "tabular" => Some(SourceFormat::Csv),
            "parquet" | "pq" | "columnar" => Some(SourceFormat::Parquet),
            _ => None,
        }
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jsonl" | "ndjson" | "json" => Some(SourceFormat::Jsonl),
            "csv" | "tsv" => Some(SourceFormat::Csv),
            "parquet" | "pq" => Some(SourceFormat::Parquet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Jsonl => "jsonl",
            SourceFormat::Csv => "csv",
            SourceFormat::Parquet => "parquet",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("a/b.jsonl")), Some(SourceFormat::Jsonl));
        assert_eq!(SourceFormat::from_path(Path::new("b.NDJSON")), Some(SourceFormat::Jsonl));
        assert_eq!(SourceFormat::from_path(Path::new("b.csv")), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_path(Path::new("b.tsv")), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_path(Path::new("b.parquet")), Some(SourceFormat::Parquet));
        assert_eq!(SourceFormat::from_path(Path::new("b.xlsx")), None);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_parse_str() {
        assert_eq!(SourceFormat::parse_str("Columnar"), Some(SourceFormat::Parquet));
        assert_eq!(SourceFormat::parse_str("tabular"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::parse_str("xml"), None);
    }
}
