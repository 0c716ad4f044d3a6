//! Clock-sweep background workers (§4.8, §5 rule 3): one daemon thread per
//! cache, polling the epoch tracker's minimum active revision and sweeping
//! until nothing more is evictable. Grounded on `cache/core.rs::Cache::new_with_config`'s
//! un-joined `std::thread::spawn` TTL sweeper, generalized from a
//! wall-clock interval to continuous eviction gated by the epoch watermark,
//! and from one cache to N, held by `Weak` so each thread exits once the
//! owning buffer manager is dropped.

use super::keys::CacheKey;
use super::typed_cache::TypedCache;
use crate::types::Revision;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Spawns a daemon sweeper thread for `cache`. The thread polls
/// `min_active_revision` every `interval` and performs sweep passes until a
/// pass finds nothing evictable, then sleeps again. It exits silently once
/// the last strong reference to `cache` is dropped.
pub fn spawn<K, V>(
    cache: &Arc<TypedCache<K, V>>,
    min_active_revision: impl Fn() -> Revision + Send + 'static,
    interval: Duration,
) -> std::thread::JoinHandle<()>
where
    K: CacheKey,
    V: Clone + Send + Sync + 'static,
{
    let weak: Weak<TypedCache<K, V>> = Arc::downgrade(cache);
    std::thread::spawn(move || {
        loop {
            std::thread::sleep(interval);
            let Some(cache) = weak.upgrade() else { return };
            let watermark = min_active_revision();
            while cache.sweep_one(watermark) {}
        }
    })
}
