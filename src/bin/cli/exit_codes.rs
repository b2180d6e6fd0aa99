//! Exit codes for the CLI tool.

use portzip::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Invalid command line arguments
pub const USAGE: i32 = 1;
/// Runtime failure while building the archive
pub const RUNTIME: i32 = 2;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Usage,
    Runtime,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Usage => USAGE,
            Self::Runtime => RUNTIME,
        }
    }
}

/// Converts a portzip error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    if error.is_usage_error() {
        ExitCode::Usage
    } else {
        ExitCode::Runtime
    }
}
