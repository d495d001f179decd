// ============================================================================
// vidpipe-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the Pipeline Engine
//
// Defines `CoreError`, the single error type returned by every fallible
// operation in vidpipe-core, and `ErrorKind`, the coarse classification used
// by callers to decide how to report a failure.
//
// KEY COMPONENTS:
// - CoreError: thiserror-derived enum of all failure modes
// - ErrorKind: Config / Resolution / Validation / AssetNotFound / Processing / Io
// - Helper constructors for external command failures

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Resolution,
    Validation,
    AssetNotFound,
    Processing,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Config => "configuration error",
            ErrorKind::Resolution => "resolution error",
            ErrorKind::Validation => "validation error",
            ErrorKind::AssetNotFound => "asset not found",
            ErrorKind::Processing => "processing error",
            ErrorKind::Io => "I/O error",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid pipeline configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown module '{0}'")]
    Resolution(String),

    #[error("Invalid parameter for module '{module}': {message}")]
    Validation { module: String, message: String },

    #[error("Module '{module}' references a missing file: {path}")]
    AssetNotFound { module: String, path: PathBuf },

    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("{0} exited with {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("{0}")]
    OperationFailed(String),

    #[error("Stage {} ({module}) failed: {source}", .stage + 1)]
    StageFailed {
        stage: usize,
        module: String,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Classifies the error. Stage failures report the kind of their cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Io(_) | CoreError::InputNotFound(_) => ErrorKind::Io,
            CoreError::Config(_) | CoreError::ConfigParse { .. } => ErrorKind::Config,
            CoreError::Resolution(_) => ErrorKind::Resolution,
            CoreError::Validation { .. } => ErrorKind::Validation,
            CoreError::AssetNotFound { .. } => ErrorKind::AssetNotFound,
            CoreError::DependencyNotFound(_)
            | CoreError::CommandStart(..)
            | CoreError::CommandWait(..)
            | CoreError::CommandFailed(..)
            | CoreError::OperationFailed(_) => ErrorKind::Processing,
            CoreError::StageFailed { source, .. } => source.kind(),
        }
    }

    /// Index of the failing stage, if the error came from a running stage.
    pub fn stage(&self) -> Option<usize> {
        match self {
            CoreError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

// ---- Helper constructors ----

pub fn validation_error(module: &str, message: impl Into<String>) -> CoreError {
    CoreError::Validation {
        module: module.to_string(),
        message: message.into(),
    }
}

pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}
