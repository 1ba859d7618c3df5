//! Process-wide resources shared by every file.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::SessionConfig;
use crate::processing::ModelSessions;
use crate::utils::{CoreError, CoreResult};
use crate::worker::{WorkerError, WorkerPool};

/// Model sessions plus the two worker pools.
///
/// Created once; the model sessions are published once and never replaced.
pub struct Session<H> {
    model_sessions: Option<Arc<ModelSessions<H>>>,
    work_pool: WorkerPool,
    discover_pool: WorkerPool,
}

impl<H> Session<H> {
    /// Creates the pools. Must be called within a tokio runtime.
    pub fn new(config: &SessionConfig, faults: mpsc::UnboundedSender<WorkerError>) -> Self {
        debug!(
            "Creating session (work: {}, discover: {})",
            config.work_workers, config.discover_workers
        );
        Self {
            model_sessions: None,
            work_pool: WorkerPool::new("work", config.work_workers, faults.clone()),
            discover_pool: WorkerPool::new("discover", config.discover_workers, faults),
        }
    }

    /// True once the registry has published
    pub fn is_ready(&self) -> bool {
        self.model_sessions.is_some()
    }

    pub fn model_sessions(&self) -> Option<&Arc<ModelSessions<H>>> {
        self.model_sessions.as_ref()
    }

    pub fn publish(&mut self, sessions: Arc<ModelSessions<H>>) -> CoreResult<()> {
        if self.model_sessions.is_some() {
            return Err(CoreError::AlreadyPublished);
        }
        self.model_sessions = Some(sessions);
        Ok(())
    }

    pub fn work_pool(&self) -> &WorkerPool {
        &self.work_pool
    }

    pub fn discover_pool(&self) -> &WorkerPool {
        &self.discover_pool
    }

    /// Stops both pools; queued discovery runs and file jobs never start.
    pub fn close(&self) {
        self.work_pool.close();
        self.discover_pool.close();
    }
}

impl<H> Drop for Session<H> {
    fn drop(&mut self) {
        self.close();
    }
}
