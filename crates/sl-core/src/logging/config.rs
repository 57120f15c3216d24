//! Log settings resolved from the environment and the global CLI flags.
//!
//! Precedence, lowest first: built-in default (info, human), `RUST_LOG`
//! directives, `SCRUBLINE_LOG` / `SCRUBLINE_LOG_FORMAT`, then `-q`/`-v`
//! and `--log-format`.

use tracing_subscriber::filter::LevelFilter;

/// Environment variable with a bare level (`warn`, `debug`, ...).
pub const ENV_LOG: &str = "SCRUBLINE_LOG";
/// Environment variable selecting `human` or `jsonl` output.
pub const ENV_LOG_FORMAT: &str = "SCRUBLINE_LOG_FORMAT";
/// Fallback per-target directives, consulted only without `SCRUBLINE_LOG`.
pub const ENV_RUST_LOG: &str = "RUST_LOG";

/// How log lines are rendered on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event, for log shippers.
    Jsonl,
}

impl LogFormat {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Some(LogFormat::Human),
            "jsonl" | "json" => Some(LogFormat::Jsonl),
            _ => None,
        }
    }
}

/// The logging-related global flags as parsed by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFlags {
    pub quiet: bool,
    pub verbose: u8,
    pub format: Option<LogFormat>,
}

impl LogFlags {
    /// `-q` keeps errors only; `-v` is debug and `-vv` or more is trace.
    pub fn level(&self) -> Option<LevelFilter> {
        if self.quiet {
            return Some(LevelFilter::ERROR);
        }
        match self.verbose {
            0 => None,
            1 => Some(LevelFilter::DEBUG),
            _ => Some(LevelFilter::TRACE),
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Level for every target without its own directive.
    pub level: LevelFilter,
    /// `RUST_LOG`-style per-target directives; empty when none apply.
    pub directives: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LevelFilter::INFO,
            directives: String::new(),
        }
    }
}

impl LogConfig {
    /// Resolve against the process environment.
    pub fn from_env(flags: LogFlags) -> Self {
        Self::resolve(flags, |name| std::env::var(name).ok())
    }

    /// Resolve with `lookup` standing in for the environment.
    pub fn resolve(flags: LogFlags, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = LogConfig::default();

        match lookup(ENV_LOG) {
            Some(value) => {
                if let Ok(level) = value.trim().parse::<LevelFilter>() {
                    config.level = level;
                }
            }
            None => {
                if let Some(directives) = lookup(ENV_RUST_LOG) {
                    config.directives = directives;
                }
            }
        }

        if let Some(level) = flags.level() {
            config.level = level;
            config.directives.clear();
        }

        config.format = flags
            .format
            .or_else(|| lookup(ENV_LOG_FORMAT).and_then(|v| LogFormat::parse_str(&v)))
            .unwrap_or_default();

        config
    }
}
