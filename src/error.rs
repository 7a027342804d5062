//! Structured error handling and exit codes.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::output::ReportError;

/// Exit codes for the dupesort application.
///
/// Per-file failures never change the exit code; they are listed in the
/// report instead.
/// - 0: Success (run completed, possibly with per-file errors)
/// - 1: General error (unexpected failure, e.g. invalid configuration)
/// - 2: Root path missing or not a directory
/// - 3: Report could not be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// The root path does not exist or is not a directory.
    PathNotFound = 2,
    /// The report file could not be written.
    ReportWriteError = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::PathNotFound => "DS002",
            Self::ReportWriteError => "DS003",
        }
    }

    /// Pick the exit code for an error returned by [`crate::run_app`].
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<AppError>() {
            Some(AppError::PathNotFound(_) | AppError::NotADirectory(_)) => Self::PathNotFound,
            Some(AppError::ReportWrite(_)) => Self::ReportWriteError,
            None => Self::GeneralError,
        }
    }
}

/// Fatal errors that end a run.
#[derive(Debug, Error)]
pub enum AppError {
    /// The root path does not exist.
    #[error("root path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// The root path is not a directory.
    #[error("root path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The report could not be written.
    #[error("failed to write report: {0}")]
    ReportWrite(#[source] ReportError),
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
