//! Shared-read and exclusive-write scopes over the project's document model

use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Project-wide reader/writer lock
///
/// Many read scopes may overlap; a write scope excludes every reader. Read
/// guards are meant to be held only around synchronous code-model access,
/// never across an `.await`.
#[derive(Clone, Default)]
pub struct ProjectLock {
    inner: Arc<RwLock<()>>,
}

/// Guard for a shared read scope
pub type ReadScope = OwnedRwLockReadGuard<()>;

/// Guard for the exclusive write scope
pub type WriteScope = OwnedRwLockWriteGuard<()>;

impl ProjectLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a shared read scope
    pub async fn read(&self) -> ReadScope {
        self.inner.clone().read_owned().await
    }

    /// Enter the exclusive write scope
    pub async fn write(&self) -> WriteScope {
        self.inner.clone().write_owned().await
    }

    /// Enter the write scope only if nobody holds the lock
    pub fn try_write(&self) -> Option<WriteScope> {
        self.inner.clone().try_write_owned().ok()
    }

    /// Check whether a writer currently holds the lock
    pub fn is_write_locked(&self) -> bool {
        // If we can't acquire a read lock, it's write-locked
        self.inner.try_read().is_err()
    }
}
