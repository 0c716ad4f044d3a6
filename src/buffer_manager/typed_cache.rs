//! A single clock-sweep typed cache (§4.8). Grounded on `cache/core.rs::Cache`
//! (`Arc<RwLock<..>>`-guarded store, a background sweeper thread spawned at
//! construction), generalized from TTL-then-LRU eviction to reference-bit
//! clock-sweep eviction gated by the epoch tracker's minimum active
//! revision rather than a wall-clock TTL.

use super::keys::CacheKey;
use crate::types::{DatabaseId, Revision};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

struct Entry<V> {
    value: V,
    referenced: bool,
    dirty: bool,
    /// The oldest revision that still needs this entry; a sweep may not
    /// evict while `min_active_revision < min_revision`.
    min_revision: Revision,
}

struct Shared<K: CacheKey, V> {
    entries: HashMap<K, Entry<V>>,
    /// Clock hand: a ring of keys visited in round-robin order by the
    /// sweeper. A key may appear at most once.
    clock: VecDeque<K>,
}

/// A typed, reference-counted handle to one of the buffer manager's six
/// caches. Cloning is cheap; every clone shares the same backing store.
pub struct TypedCache<K: CacheKey, V: Clone> {
    shared: Arc<RwLock<Shared<K, V>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K: CacheKey, V: Clone> TypedCache<K, V> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(RwLock::new(Shared { entries: HashMap::new(), clock: VecDeque::new() })),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Reads `key`, setting its reference bit so a clock sweep gives it a
    /// second chance before eviction.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let mut shared = self.shared.write();
        if let Some(entry) = shared.entries.get_mut(key) {
            entry.referenced = true;
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(entry.value.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Inserts or replaces `key`, marking the entry dirty (it must survive
    /// until flushed by the commit path) and stamping it with
    /// `min_revision`, the oldest revision still permitted to evict it.
    pub fn insert(&self, key: K, value: V, min_revision: Revision, dirty: bool) {
        let mut shared = self.shared.write();
        let is_new = !shared.entries.contains_key(&key);
        shared.entries.insert(key.clone(), Entry { value, referenced: false, dirty, min_revision });
        if is_new {
            shared.clock.push_back(key);
        }
        if shared.entries.len() > self.capacity {
            drop(shared);
            self.sweep_one(Revision::NONE);
        }
    }

    pub fn mark_clean(&self, key: &K) {
        if let Some(entry) = self.shared.write().entries.get_mut(key) {
            entry.dirty = false;
        }
    }

    /// Invalidates every entry whose key matches `db_id`/`resource_id`
    /// (§4.8's `clearCachesFor`).
    pub fn clear_matching(&self, db_id: DatabaseId, resource_id: Option<crate::types::ResourceId>) {
        let mut shared = self.shared.write();
        shared.entries.retain(|k, _| !k.matches_prefix(db_id, resource_id));
        shared.clock.retain(|k| !k.matches_prefix(db_id, resource_id));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One clock-sweep step: advances the hand by one entry, clearing
    /// reference bits and evicting the first unreferenced, non-dirty entry
    /// whose watermark has fallen behind `min_active_revision`. Never
    /// evicts a dirty entry (§4.8: "dirty entries are never evicted while
    /// pinned; they are flushed by the commit path").
    pub fn sweep_one(&self, min_active_revision: Revision) -> bool {
        let mut shared = self.shared.write();
        let rounds = shared.clock.len();
        for _ in 0..rounds {
            let Some(key) = shared.clock.pop_front() else { break };
            let evictable = {
                let Some(entry) = shared.entries.get_mut(&key) else { continue };
                if entry.referenced {
                    entry.referenced = false;
                    false
                } else {
                    !entry.dirty && entry.min_revision.0 <= min_active_revision.0
                }
            };
            if evictable {
                shared.entries.remove(&key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                return true;
            }
            shared.clock.push_back(key);
        }
        false
    }

    #[must_use]
    pub fn stats(&self) -> (u64, u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed), self.evictions.load(Ordering::Relaxed))
    }
}

impl<K: CacheKey, V: Clone> Clone for TypedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            capacity: self.capacity,
            hits: AtomicU64::new(self.hits.load(Ordering::Relaxed)),
            misses: AtomicU64::new(self.misses.load(Ordering::Relaxed)),
            evictions: AtomicU64::new(self.evictions.load(Ordering::Relaxed)),
        }
    }
}
