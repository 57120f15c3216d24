//! Exit codes for the `scrubline` binary.
//!
//! Codes are a stable contract for automation:
//! - 0: every record sanitized
//! - 1: run completed, some records failed and were skipped
//! - 2: usage or configuration error
//! - 3: source or output could not be read or written
//! - 4: stream aborted on a failed record

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Clean run
    Ok = 0,

    /// Completed under skip-record with at least one failure
    RecordsFailed = 1,

    /// Invalid arguments, settings or mapping
    ConfigError = 2,

    /// Connection or I/O failure
    IoError = 3,

    /// Aborted under abort-stream
    Aborted = 4,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Ok
    }

    /// Get the code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::RecordsFailed => "ERR_RECORDS_FAILED",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::IoError => "ERR_IO",
            ExitCode::Aborted => "ERR_ABORTED",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
