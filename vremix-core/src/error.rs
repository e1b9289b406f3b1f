// ============================================================================
// vremix-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core Error Types
//
// This module defines the error type shared by every component of the remix
// engine. Errors are per-file: a failure while remixing one input never
// carries state that would stop the rest of a batch.
//
// KEY COMPONENTS:
// - CoreError: the error enum (thiserror)
// - CoreResult: result alias used across the crate
// - Helper constructors for subprocess failures

use crate::params::Dimension;

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the remix engine.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The entropy source used to seed parameter sampling failed.
    #[error("Parameter sampling failed: {0}")]
    Sampling(String),

    /// A ParameterSet reached the compiler without a required dimension.
    #[error("Parameter set is missing dimension '{0}'")]
    MissingDimension(Dimension),

    /// A value handed to the compiler lies outside its declared bounds.
    #[error("Parameter '{name}' = {value} is outside [{min}, {max}]")]
    ParameterOutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Remix of '{input}' failed: {detail}")]
    ExecutionFailed { input: PathBuf, detail: String },

    /// Neither the enhanced tool nor the fallback could strip metadata.
    #[error("Metadata scrubbing failed for '{path}': {detail}")]
    ScrubFailed { path: PathBuf, detail: String },

    #[error("Failed to write run record '{path}': {detail}")]
    RecordWrite { path: PathBuf, detail: String },

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] std::io::Error),

    #[error("Failed to wait for command '{0}': {1}")]
    CommandWait(String, #[source] std::io::Error),

    #[error("Command '{command}' failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No media files found")]
    NoFilesFound,

    #[error("Output already exists: {0}")]
    OutputExists(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result alias used throughout vremix-core.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a `CommandStart` error for a command that could not be spawned.
pub fn command_start_error(command: impl Into<String>, error: std::io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), error)
}

/// Builds a `CommandWait` error for a command whose exit could not be observed.
pub fn command_wait_error(command: impl Into<String>, error: std::io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), error)
}

/// Builds a `CommandFailed` error from an exit status and captured stderr.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}
