use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::Settings;
use crate::processing::DiscoveryRequest;
use crate::utils::{absolutize, CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Discover(DiscoveryRequest),
    UpdateSettings(Settings),
    /// Drop every finished file from the list
    ClearCompleted,
    /// Drop one file from the list, whatever its status
    Remove(PathBuf),
    Shutdown,
}

/// Cloneable sender side of a session's command channel.
///
/// Every method fails with [`CoreError::SessionClosed`] once the controller
/// has stopped.
#[derive(Debug, Clone)]
pub struct CommandHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl CommandHandle {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (commands, rx) = mpsc::unbounded_channel();
        (Self { commands }, rx)
    }

    /// Discovers individually selected files.
    pub fn open_files<I, P>(&self, paths: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.discover(DiscoveryRequest::Files(paths.into_iter().map(Into::into).collect()))
    }

    /// Discovers every image below `folder`.
    pub fn open_folder(&self, folder: impl Into<PathBuf>) -> CoreResult<()> {
        self.discover(DiscoveryRequest::Folder(folder.into()))
    }

    /// Discovers dropped paths, files and folders mixed.
    pub fn open_mixed<I, P>(&self, paths: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.discover(DiscoveryRequest::Mixed(paths.into_iter().map(Into::into).collect()))
    }

    pub fn discover(&self, request: DiscoveryRequest) -> CoreResult<()> {
        self.send(Command::Discover(request))
    }

    /// Applies to files dispatched after the change; running jobs keep theirs.
    pub fn update_settings(&self, settings: Settings) -> CoreResult<()> {
        self.send(Command::UpdateSettings(settings))
    }

    pub fn clear_completed(&self) -> CoreResult<()> {
        self.send(Command::ClearCompleted)
    }

    pub fn remove(&self, source: impl Into<PathBuf>) -> CoreResult<()> {
        self.send(Command::Remove(absolutize(source.into())))
    }

    pub fn shutdown(&self) -> CoreResult<()> {
        self.send(Command::Shutdown)
    }

    fn send(&self, command: Command) -> CoreResult<()> {
        debug!("Sending command: {:?}", command);
        self.commands
            .send(command)
            .map_err(|_| CoreError::SessionClosed)
    }
}
