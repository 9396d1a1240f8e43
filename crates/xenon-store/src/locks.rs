//! Per-project reader/writer exclusion.
//!
//! Saves take the write side, runs hold the read side for the whole
//! execution. Different projects never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::naming::ProjectId;

/// Registry size above which idle entries are dropped.
const PRUNE_THRESHOLD: usize = 1024;

/// Registry handing out one lock per project.
#[derive(Debug, Default)]
pub struct ProjectLocks {
    entries: Mutex<HashMap<ProjectId, Arc<RwLock<()>>>>,
}

impl ProjectLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock guarding `project`, creating it on first use.
    pub fn lock_for(&self, project: &ProjectId) -> ProjectLock {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.len() > PRUNE_THRESHOLD {
            entries.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        let inner = Arc::clone(entries.entry(project.clone()).or_default());
        ProjectLock { inner }
    }

    /// Number of projects currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when no project has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared handle on one project's lock.
#[derive(Debug, Clone)]
pub struct ProjectLock {
    inner: Arc<RwLock<()>>,
}

impl ProjectLock {
    /// Acquires the shared side, blocking while a save is in progress.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Acquires the exclusive side, blocking while runs are in progress.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
