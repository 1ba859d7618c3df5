use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, trace};
use crate::worker::{WorkerError, WorkerResult};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-capacity pool running blocking jobs on tokio's blocking threads.
///
/// Jobs start in submission order; at most `capacity` run at once and the
/// rest wait in an unbounded queue, so `submit` never blocks. A job that
/// panics is reported on the fault channel given to [`WorkerPool::new`].
///
/// [`WorkerPool::close`] stops the pool: running jobs finish, queued jobs are
/// dropped without running.
#[derive(Clone)]
pub struct WorkerPool {
    name: &'static str,
    capacity: usize,
    queue: mpsc::UnboundedSender<Job>,
    active: Arc<AtomicUsize>,
    queued: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Creates the pool and its dispatch task. Must be called within a tokio runtime.
    pub fn new(
        name: &'static str,
        capacity: usize,
        faults: mpsc::UnboundedSender<WorkerError>,
    ) -> Self {
        let capacity = capacity.max(1);
        let (queue, jobs) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicUsize::new(0));
        let queued = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicBool::new(false));

        tokio::spawn(dispatch(
            name,
            jobs,
            Arc::new(Semaphore::new(capacity)),
            Arc::clone(&active),
            Arc::clone(&queued),
            Arc::clone(&closed),
            faults,
        ));
        debug!("Worker pool '{}' started with {} workers", name, capacity);

        Self {
            name,
            capacity,
            queue,
            active,
            queued,
            closed,
        }
    }

    /// Queues `job` without waiting for a free worker.
    pub fn submit<F>(&self, job: F) -> WorkerResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_closed() {
            return Err(WorkerError::Closed { pool: self.name });
        }
        self.queued.fetch_add(1, Ordering::SeqCst);
        self.queue.send(Box::new(job)).map_err(|_| {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            WorkerError::Closed { pool: self.name }
        })
    }

    /// Stops starting queued jobs. Jobs already running are not interrupted.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(
                "Closing worker pool '{}' - Active: {}, Dropping queued: {}",
                self.name,
                self.active(),
                self.queued()
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jobs currently running
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Jobs submitted but not started yet
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }
}

/// Decrements the active counter even if the job unwinds.
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn dispatch(
    name: &'static str,
    mut jobs: mpsc::UnboundedReceiver<Job>,
    semaphore: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
    queued: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
    faults: mpsc::UnboundedSender<WorkerError>,
) {
    while let Some(job) = jobs.recv().await {
        // The semaphore is never closed, so this only fails if the runtime is going away.
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        if closed.load(Ordering::SeqCst) {
            break;
        }
        queued.fetch_sub(1, Ordering::SeqCst);
        active.fetch_add(1, Ordering::SeqCst);
        trace!(
            "Pool '{}' starting job - Active: {}, Queued: {}",
            name,
            active.load(Ordering::SeqCst),
            queued.load(Ordering::SeqCst)
        );

        let guard = ActiveGuard(Arc::clone(&active));
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _guard = guard;
            job();
        });

        let faults = faults.clone();
        tokio::spawn(async move {
            if let Err(e) = handle.await {
                let fault = WorkerError::from_join(name, e);
                error!("{}", fault);
                let _ = faults.send(fault);
            }
        });
    }
    debug!("Worker pool '{}' shut down", name);
}
