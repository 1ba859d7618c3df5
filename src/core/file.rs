//! Discovered files and the observable file set.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use serde::Serialize;

use crate::core::FileStatus;
use crate::utils::{CoreError, CoreResult};

/// One unit of work: a source image and where its result goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Absolute input path; identifies the file
    pub source: PathBuf,
    /// Absolute destination path
    pub output: PathBuf,
    pub status: FileStatus,
}

impl FileEntry {
    pub fn pending(source: PathBuf, output: PathBuf) -> Self {
        Self {
            source,
            output,
            status: FileStatus::Pending,
        }
    }
}

/// Number of files in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub running: usize,
    pub done: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.running + self.done + self.error
    }
}

/// Files currently shown to the user, keyed by source path.
#[derive(Debug, Default)]
pub struct FileSet {
    entries: BTreeMap<PathBuf, FileEntry>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`. Returns false (and changes nothing) if its source is
    /// already present.
    pub fn insert(&mut self, entry: FileEntry) -> bool {
        if self.entries.contains_key(&entry.source) {
            return false;
        }
        self.entries.insert(entry.source.clone(), entry);
        true
    }

    pub fn get(&self, source: &Path) -> Option<&FileEntry> {
        self.entries.get(source)
    }

    pub fn contains(&self, source: &Path) -> bool {
        self.entries.contains_key(source)
    }

    /// Moves a file to `next`, enforcing the status state machine.
    ///
    /// Returns `Ok(None)` when the file is no longer in the set.
    pub fn transition(&mut self, source: &Path, next: FileStatus) -> CoreResult<Option<&FileEntry>> {
        let Some(entry) = self.entries.get_mut(source) else {
            return Ok(None);
        };
        if !entry.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                path: source.to_path_buf(),
                from: entry.status,
                to: next,
            });
        }
        entry.status = next;
        Ok(Some(entry))
    }

    pub fn remove(&mut self, source: &Path) -> Option<FileEntry> {
        self.entries.remove(source)
    }

    /// Drops every `Done` entry and returns their sources.
    pub fn clear_completed(&mut self) -> Vec<PathBuf> {
        let done: Vec<PathBuf> = self
            .entries
            .values()
            .filter(|entry| entry.status == FileStatus::Done)
            .map(|entry| entry.source.clone())
            .collect();
        for source in &done {
            self.entries.remove(source);
        }
        done
    }

    /// Snapshot ordered for display: by status rank, then source path.
    pub fn entries(&self) -> Vec<FileEntry> {
        let mut entries: Vec<FileEntry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| {
            a.status
                .sort_rank()
                .cmp(&b.status.sort_rank())
                .then_with(|| a.source.cmp(&b.source))
        });
        entries
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in self.entries.values() {
            match entry.status {
                FileStatus::Pending => counts.pending += 1,
                FileStatus::Running => counts.running += 1,
                FileStatus::Done => counts.done += 1,
                FileStatus::Error => counts.error += 1,
            }
        }
        counts
    }

    /// True when no file is waiting or being processed
    pub fn is_settled(&self) -> bool {
        self.entries.values().all(|entry| entry.status.is_terminal())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
