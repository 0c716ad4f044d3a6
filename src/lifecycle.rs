//! Write-lock registry and open-session bookkeeping (§4.10, §5 rule 1).
//! `WriteLocksRegistry` is grounded on the teacher's single-writer intent
//! expressed informally through `collection::Collection::build_lock`,
//! generalized into an explicit, lazily-created per-resource semaphore
//! registry; `ResourceStore` is a new component enforcing the spec's
//! at-most-one-open-session rule.

use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single-permit semaphore: at most one holder at a time, blocking
/// acquisition, guaranteed release via RAII (§5 rule 1).
pub struct WriteLock {
    held: Mutex<bool>,
    free: Condvar,
}

impl WriteLock {
    fn new() -> Arc<Self> {
        Arc::new(Self { held: Mutex::new(false), free: Condvar::new() })
    }

    /// Blocks until the permit is available, then takes it.
    pub fn acquire(self: &Arc<Self>) -> WriteLockGuard {
        let mut held = self.held.lock();
        while *held {
            self.free.wait(&mut held);
        }
        *held = true;
        WriteLockGuard { lock: Arc::clone(self) }
    }

    /// Takes the permit only if free, without blocking.
    pub fn try_acquire(self: &Arc<Self>) -> Option<WriteLockGuard> {
        let mut held = self.held.lock();
        if *held {
            return None;
        }
        *held = true;
        Some(WriteLockGuard { lock: Arc::clone(self) })
    }

    fn release(&self) {
        *self.held.lock() = false;
        self.free.notify_one();
    }
}

/// RAII guard for a held [`WriteLock`] permit; dropping it releases the
/// permit on every path, including panics and early returns from an
/// aborted commit.
pub struct WriteLockGuard {
    lock: Arc<WriteLock>,
}

impl Drop for WriteLockGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}

/// Maps resource path to its write-lock semaphore, created lazily on first
/// acquisition.
#[derive(Default)]
pub struct WriteLocksRegistry {
    locks: RwLock<HashMap<PathBuf, Arc<WriteLock>>>,
}

impl WriteLocksRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, resource_path: &Path) -> Arc<WriteLock> {
        if let Some(existing) = self.locks.read().get(resource_path) {
            return Arc::clone(existing);
        }
        Arc::clone(
            self.locks
                .write()
                .entry(resource_path.to_path_buf())
                .or_insert_with(WriteLock::new),
        )
    }
}

/// Enforces at-most-one open [`crate::session::ResourceSession`] per
/// resource path (§4.10, §5 rule 6's `sessions.containsAnyEntry(path)`
/// gate on destructive operations).
#[derive(Default)]
pub struct ResourceStore {
    open: RwLock<HashMap<PathBuf, Arc<crate::session::ResourceSession>>>,
}

impl ResourceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, resource_path: &Path) -> Option<Arc<crate::session::ResourceSession>> {
        self.open.read().get(resource_path).cloned()
    }

    #[must_use]
    pub fn contains_any(&self) -> bool {
        !self.open.read().is_empty()
    }

    pub fn insert(&self, resource_path: PathBuf, session: Arc<crate::session::ResourceSession>) {
        self.open.write().insert(resource_path, session);
    }

    pub fn remove(&self, resource_path: &Path) -> Option<Arc<crate::session::ResourceSession>> {
        self.open.write().remove(resource_path)
    }

    pub fn resource_paths(&self) -> Vec<PathBuf> {
        self.open.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[test]
    fn second_acquire_blocks_until_first_releases() {
        let registry = WriteLocksRegistry::new();
        let path = PathBuf::from("/tmp/res-a");
        let lock = registry.lock_for(&path);
        let guard = lock.acquire();

        let lock2 = registry.lock_for(&path);
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = Arc::clone(&flag);
        let handle = std::thread::spawn(move || {
            let _g = lock2.acquire();
            flag_clone.store(true, Ordering::SeqCst);
        });

        std::thread::sleep(Duration::from_millis(50));
        assert!(!flag.load(Ordering::SeqCst));
        drop(guard);
        handle.join().unwrap();
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn try_acquire_fails_while_held() {
        let lock = WriteLock::new();
        let _guard = lock.acquire();
        assert!(lock.try_acquire().is_none());
    }

    #[test]
    fn same_path_always_returns_same_lock() {
        let registry = WriteLocksRegistry::new();
        let path = PathBuf::from("/tmp/res-b");
        assert!(Arc::ptr_eq(&registry.lock_for(&path), &registry.lock_for(&path)));
    }
}
