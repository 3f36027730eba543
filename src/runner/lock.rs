use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::error::{Error, Result};

/// Identity of a run: one playlist in one user's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunKey {
    pub user: String,
    pub playlist: String,
}

impl RunKey {
    pub fn new(user: impl Into<String>, playlist: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            playlist: playlist.into(),
        }
    }
}

/// Registry of running playlists.
///
/// Cloning shares the registry. The lock is never held across an await.
#[derive(Debug, Clone, Default)]
pub struct RunLocks {
    held: Arc<Mutex<HashSet<RunKey>>>,
}

impl RunLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the playlist as running, or fails with [`Error::AlreadyRunning`].
    ///
    /// The returned guard releases the playlist when dropped.
    pub fn try_acquire(&self, user: &str, playlist: &str) -> Result<RunGuard> {
        let key = RunKey::new(user, playlist);
        if !self.held().insert(key.clone()) {
            return Err(Error::AlreadyRunning(playlist.to_string()));
        }
        Ok(RunGuard {
            locks: self.clone(),
            key,
        })
    }

    pub fn is_running(&self, user: &str, playlist: &str) -> bool {
        self.held().contains(&RunKey::new(user, playlist))
    }

    pub fn running(&self) -> usize {
        self.held().len()
    }

    fn held(&self) -> MutexGuard<'_, HashSet<RunKey>> {
        // the set stays consistent even if a holder panicked
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct RunGuard {
    locks: RunLocks,
    key: RunKey,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.locks.held().remove(&self.key);
    }
}
