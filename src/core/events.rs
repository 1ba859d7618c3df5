//! Event bus payloads and the observer interface.
//!
//! Workers never touch shared state. They send [`Event`]s to the controller,
//! which applies them and forwards the result to the [`Observer`] on its own
//! execution context.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::{FileEntry, FileSet, FileStatus, ModelKind};
use crate::processing::ModelSessions;
use crate::utils::{error_chain, ModelLoadError, ProcessError};

/// Message sent from workers and the registry to the controller.
pub enum Event<H> {
    /// A discovery run yielded an image
    Discovered { source: PathBuf, output: PathBuf },
    /// A discovery run has yielded everything it will yield
    DiscoveryFinished,
    /// The registry loaded every model
    ModelsLoaded(Arc<ModelSessions<H>>),
    /// A job moved a file to a new status
    StatusChanged { source: PathBuf, status: FileStatus },
    Fatal(FatalError),
}

impl<H> fmt::Debug for Event<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovered { source, output } => f
                .debug_struct("Discovered")
                .field("source", source)
                .field("output", output)
                .finish(),
            Self::DiscoveryFinished => f.write_str("DiscoveryFinished"),
            Self::ModelsLoaded(sessions) => f
                .debug_tuple("ModelsLoaded")
                .field(&sessions.models())
                .finish(),
            Self::StatusChanged { source, status } => f
                .debug_struct("StatusChanged")
                .field("source", source)
                .field("status", status)
                .finish(),
            Self::Fatal(err) => f.debug_tuple("Fatal").field(err).finish(),
        }
    }
}

pub type EventSender<H> = mpsc::UnboundedSender<Event<H>>;
pub type EventReceiver<H> = mpsc::UnboundedReceiver<Event<H>>;

/// What a fatal error is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum FatalContext {
    Model(ModelKind),
    Registry,
    File(PathBuf),
}

impl fmt::Display for FatalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(model) => write!(f, "model {model}"),
            Self::Registry => f.write_str("model registry"),
            Self::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

/// Failure the user must acknowledge; ends the session under the halt policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FatalError {
    pub context: FatalContext,
    /// The error and its full source chain
    pub detail: String,
}

impl FatalError {
    pub fn file(source: PathBuf, err: &ProcessError) -> Self {
        Self {
            context: FatalContext::File(source),
            detail: error_chain(err),
        }
    }

    pub fn model_load(err: &ModelLoadError) -> Self {
        let context = match err {
            ModelLoadError::Failed { model, .. } => FatalContext::Model(*model),
            ModelLoadError::Aborted(_) | ModelLoadError::Incomplete { .. } => FatalContext::Registry,
        };
        Self {
            context,
            detail: error_chain(err),
        }
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fatal error in {}: {}", self.context, self.detail)
    }
}

/// Coarse summary of what the session is busy with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Activity {
    Discovering,
    LoadingModels,
    Processing,
    Idle,
}

impl Activity {
    /// Picks the most relevant activity, in priority order.
    pub fn derive(discovering: usize, models_ready: bool, files: &FileSet) -> Self {
        if discovering > 0 {
            Self::Discovering
        } else if !models_ready {
            Self::LoadingModels
        } else if !files.is_settled() {
            Self::Processing
        } else {
            Self::Idle
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Discovering => "Discovering files...",
            Self::LoadingModels => "Loading models...",
            Self::Processing => "Processing files...",
            Self::Idle => "Idle",
        };
        f.write_str(text)
    }
}

/// Receiver of session notifications, typically the GUI layer.
///
/// Every method is called from the controller loop, never from a worker.
pub trait Observer: Send + 'static {
    /// A new file entered the set
    fn discovered(&mut self, _file: &FileEntry) {}

    /// The file set changed (new file, status change or removal)
    fn set_changed(&mut self, _files: &FileSet) {}

    /// Something failed that the user has to see
    fn fatal(&mut self, error: &FatalError);

    fn activity(&mut self, _activity: Activity) {}
}
