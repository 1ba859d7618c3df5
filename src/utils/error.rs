//! Error types for the orchestration core.
//!
//! Provides a hierarchy of error types using `thiserror`, one per layer:
//! - [`CoreError`]: programming faults and session-level failures
//! - [`ProcessError`]: a single file failed to process
//! - [`ModelLoadError`]: the model registry could not be populated

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::{FileStatus, ModelKind};
use crate::worker::WorkerError;

/// Boxed error used for sources coming out of the engine.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Main error type for the core.
///
/// Anything returned as `Err` from [`crate::Controller::run`] is a fault the
/// embedding application cannot recover from.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid session configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Work was submitted before the model registry published its sessions
    #[error("Model sessions are not loaded yet")]
    NotReady,

    /// The registry tried to publish twice
    #[error("Model sessions were already published")]
    AlreadyPublished,

    /// A file status change that the state machine does not allow
    #[error("Invalid status transition for {path}: {from} -> {to}")]
    InvalidTransition {
        path: PathBuf,
        from: FileStatus,
        to: FileStatus,
    },

    /// The controller loop is gone
    #[error("Session is closed")]
    SessionClosed,

    /// Worker pool fault
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// Config (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Failure while processing one file.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Model {0} has no loaded session")]
    ModelUnavailable(ModelKind),

    #[error("Failed to decode {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Background removal failed for {path}")]
    Engine {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("Cannot create output directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type ProcessResult<T> = Result<T, ProcessError>;

/// Failure while loading the model registry.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("Failed to load model {model}")]
    Failed {
        model: ModelKind,
        #[source]
        source: BoxError,
    },

    #[error("Model loading aborted: {0}")]
    Aborted(String),

    #[error("Model loading finished without sessions for: {missing:?}")]
    Incomplete { missing: Vec<ModelKind> },
}

// Helper methods for error creation
impl CoreError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}

impl ProcessError {
    pub fn engine(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        Self::Engine {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Renders an error followed by every error in its source chain.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
