//! Deduplicating intake queue that holds files until models are ready.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

/// Seen-set plus the list of sources waiting to be dispatched.
///
/// The seen-set only grows: a source accepted once is never accepted again
/// for the lifetime of the queue.
#[derive(Debug, Default)]
pub struct TaskQueue {
    seen: HashSet<PathBuf>,
    pending: VecDeque<PathBuf>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `source` and queues it for dispatch.
    ///
    /// Returns false if the source was seen before; nothing is queued then.
    pub fn enqueue(&mut self, source: PathBuf) -> bool {
        if !self.seen.insert(source.clone()) {
            return false;
        }
        self.pending.push_back(source);
        true
    }

    /// Takes every queued source, oldest first, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<PathBuf> {
        self.pending.drain(..).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }
}
