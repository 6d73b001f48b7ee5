//! Error types for sv-scatter.
//!
//! Task-level failures (a single converter invocation going wrong) are
//! recorded per task in [`crate::pipeline::RunReport`] and only turned into
//! [`ScatterError::ConversionFailures`] after the whole batch has joined.
//! Everything else aborts the run before any converter is started.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// All errors returned by the sv-scatter library.
#[derive(Debug, Error)]
pub enum ScatterError {
    // ── Catalog ──────────────────────────────────────────────────────────
    /// The source directory to scan does not exist.
    #[error("source directory not found: '{}'", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// The source directory exists but could not be listed.
    #[error("failed to read directory '{}': {source}", path.display())]
    DirectoryReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Converter ────────────────────────────────────────────────────────
    /// The converter program cannot be resolved on PATH.
    #[error("converter '{program}' not found on PATH")]
    ConverterNotFound { program: String },

    /// The converter process could not be spawned at all.
    #[error("failed to launch '{program}' for '{}': {source}", input.display())]
    ConverterLaunchFailed {
        input: PathBuf,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran and exited unsuccessfully.
    #[error("converter failed on '{}' ({})", input.display(), describe_exit(*exit_code))]
    ConverterInvocationFailed {
        input: PathBuf,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The converter exceeded the per-task timeout and was killed.
    #[error("converter timed out after {timeout:?} on '{}'", input.display())]
    ConverterTimedOut { input: PathBuf, timeout: Duration },

    /// The task was cancelled before it could finish.
    #[error("conversion of '{}' was cancelled", input.display())]
    Cancelled { input: PathBuf },

    // ── Output ───────────────────────────────────────────────────────────
    #[error("failed to create output directory '{}': {source}", path.display())]
    OutputDirCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The normalizer could not append to the converter's output artifact.
    #[error("failed to write output '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two conversions would write the same output file.
    #[error("output '{}' is targeted by more than one conversion", path.display())]
    OutputCollision { path: PathBuf },

    // ── Configuration ────────────────────────────────────────────────────
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ── Execution ────────────────────────────────────────────────────────
    #[error("worker thread panicked during parallel execution")]
    WorkerPanicked,

    // ── Aggregate ────────────────────────────────────────────────────────
    /// At least one conversion failed; reported after the join barrier.
    #[error("{failed}/{total} conversions failed")]
    ConversionFailures { failed: usize, total: usize },
}

impl ScatterError {
    /// Exit code reported by the converter, when it got far enough to have one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ScatterError::ConverterInvocationFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Captured converter stderr, empty for errors that never ran a process.
    pub fn stderr(&self) -> &str {
        match self {
            ScatterError::ConverterInvocationFailed { stderr, .. } => stderr,
            _ => "",
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Result type alias for sv-scatter operations
pub type Result<T> = std::result::Result<T, ScatterError>;
