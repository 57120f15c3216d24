//! Mapping path discovery.
//!
//! Resolution order: CLI argument → environment variable → config dir
//! variable → XDG config dir → none.

use std::path::{Path, PathBuf};

/// Where a mapping file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via `SCRUBLINE_MAPPING`.
    Environment,

    /// Found in `SCRUBLINE_CONFIG_DIR`.
    ConfigDir,

    /// Found in the XDG config directory.
    XdgConfig,

    /// Nothing found.
    #[default]
    NotFound,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::ConfigDir => write!(f, "config dir"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::NotFound => write!(f, "not found"),
        }
    }
}

/// Environment variable naming a mapping file.
pub const ENV_MAPPING_PATH: &str = "SCRUBLINE_MAPPING";
/// Environment variable naming a directory holding `mapping.*`.
pub const ENV_CONFIG_DIR: &str = "SCRUBLINE_CONFIG_DIR";

/// Candidate file names, in preference order.
const MAPPING_FILENAMES: &[&str] = &["mapping.json", "mapping.yaml", "mapping.yml", "mapping.toml"];

/// Application name for XDG directories.
const APP_NAME: &str = "scrubline";

/// Resolved mapping location.
#[derive(Debug, Clone, Default)]
pub struct MappingLocation {
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Find the mapping file to use.
pub fn resolve_mapping_path(cli_path: Option<&Path>) -> MappingLocation {
    // 1. CLI argument. An explicit path is returned even if missing so the
    //    caller reports the real I/O error instead of silently falling back.
    if let Some(path) = cli_path {
        return MappingLocation {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_MAPPING_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return MappingLocation {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    // 3. Config dir variable
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = find_in_dir(Path::new(&dir)) {
            return MappingLocation {
                path: Some(path),
                source: ConfigSource::ConfigDir,
            };
        }
    }

    // 4. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        if let Some(path) = find_in_dir(&config_dir.join(APP_NAME)) {
            return MappingLocation {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    MappingLocation::default()
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    MAPPING_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}
