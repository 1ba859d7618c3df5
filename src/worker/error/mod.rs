#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Worker pool '{pool}' is shut down")]
    Closed { pool: &'static str },

    #[error("Job panicked in worker pool '{pool}': {detail}")]
    Panicked { pool: &'static str, detail: String },
}

pub type WorkerResult<T> = Result<T, WorkerError>;

impl WorkerError {
    /// Builds a `Panicked` error from a failed blocking task.
    pub(crate) fn from_join(pool: &'static str, err: tokio::task::JoinError) -> Self {
        let detail = if err.is_panic() {
            let payload = err.into_panic();
            if let Some(msg) = payload.downcast_ref::<&str>() {
                (*msg).to_string()
            } else if let Some(msg) = payload.downcast_ref::<String>() {
                msg.clone()
            } else {
                "non-string panic payload".to_string()
            }
        } else {
            "task was cancelled".to_string()
        };
        WorkerError::Panicked { pool, detail }
    }
}
