use log::trace;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Process-wide table of per-logical-path reader/writer locks, used to
/// serialize conflicting operations on the same path across sessions.
///
/// Locks are created lazily. An entry whose only remaining reference is the
/// table itself is pruned on the next lookup, so the table is bounded by the
/// number of paths currently locked rather than ever touched.
pub struct PathLockManager {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

/// Shared (read) hold on one path. Dropping it releases the hold; the last
/// reader to drop admits a waiting writer.
pub struct PathReadGuard {
    _guard: OwnedRwLockReadGuard<()>,
}

/// Exclusive (write) hold on one path.
pub struct PathWriteGuard {
    _guard: OwnedRwLockWriteGuard<()>,
}

impl PathLockManager {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, path: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    pub async fn acquire_read(&self, path: &str) -> PathReadGuard {
        trace!("Acquiring read lock on {}", path);
        PathReadGuard {
            _guard: self.lock_for(path).read_owned().await,
        }
    }

    pub async fn acquire_write(&self, path: &str) -> PathWriteGuard {
        trace!("Acquiring write lock on {}", path);
        PathWriteGuard {
            _guard: self.lock_for(path).write_owned().await,
        }
    }

    /// Exclusively locks every path in the list. Paths are sorted and
    /// de-duplicated so concurrent multi-path acquisitions cannot deadlock;
    /// cancellation drops the guards acquired so far.
    pub async fn acquire_write_many(&self, paths: &[&str]) -> Vec<PathWriteGuard> {
        let mut sorted: Vec<&str> = paths.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for path in sorted {
            guards.push(self.acquire_write(path).await);
        }
        guards
    }

    /// Number of paths with a live lock entry.
    pub fn tracked_paths(&self) -> usize {
        let mut locks = self.locks.lock().unwrap();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.len()
    }
}

impl Default for PathLockManager {
    fn default() -> Self {
        Self::new()
    }
}
