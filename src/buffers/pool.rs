//! Pooled sink (§4.2): reuses a pre-allocated buffer per worker, falling
//! back to an overflow allocation only when a single serialization exceeds
//! the pool size. Modeled on the teacher's `Arc<...Lock<..>>`-wrapped shared
//! state idiom (e.g. `cache/core.rs::Cache`), since the teacher never reaches
//! for a thread-local scratch buffer itself.

use super::sink::GrowableSink;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;

/// Default per-sink pooled capacity: generously larger than a typical
/// node record payload so common encodes never hit the overflow path.
const DEFAULT_POOLED_CAPACITY: usize = 256;

/// The process-wide sink pool node serialization draws from (§4.2).
static GLOBAL: Lazy<SinkPool> = Lazy::new(|| SinkPool::new(DEFAULT_POOLED_CAPACITY));

/// Returns the process-wide sink pool, lazily created on first use.
#[must_use]
pub fn global() -> &'static SinkPool {
    &GLOBAL
}

/// A handle to a shared pool of reusable sinks. Cloning is cheap (an `Arc`
/// bump); every clone draws from the same underlying pool.
#[derive(Clone)]
pub struct SinkPool {
    inner: Arc<Mutex<Vec<GrowableSink>>>,
    pooled_capacity: usize,
}

impl SinkPool {
    #[must_use]
    pub fn new(pooled_capacity: usize) -> Self {
        Self { inner: Arc::new(Mutex::new(Vec::new())), pooled_capacity }
    }

    /// Checks out a sink: either a cleared pooled buffer or a fresh
    /// pool-sized one if none are free.
    #[must_use]
    pub fn checkout(&self) -> PooledSink {
        let sink = self.inner.lock().pop().unwrap_or_else(|| {
            GrowableSink::with_capacity(self.pooled_capacity)
        });
        PooledSink { sink: Some(sink), pool: self.inner.clone(), pooled_capacity: self.pooled_capacity }
    }
}

/// A checked-out sink. On drop (or explicit `release`), a buffer that did
/// not overflow beyond the pool's nominal capacity is cleared and returned;
/// an overflow buffer (the ~1% of writes whose serialization exceeds the
/// pool size) is released to the allocator instead of being pooled.
pub struct PooledSink {
    sink: Option<GrowableSink>,
    pool: Arc<Mutex<Vec<GrowableSink>>>,
    pooled_capacity: usize,
}

impl PooledSink {
    #[must_use]
    pub fn get_mut(&mut self) -> &mut GrowableSink {
        self.sink.as_mut().expect("sink taken only on drop")
    }

    #[must_use]
    pub fn get(&self) -> &GrowableSink {
        self.sink.as_ref().expect("sink taken only on drop")
    }

    /// Resets the sink for reuse, releasing any overflow allocation.
    pub fn reset(&mut self) {
        let Some(sink) = self.sink.as_mut() else { return };
        if sink.len() > self.pooled_capacity {
            *sink = GrowableSink::with_capacity(self.pooled_capacity);
        } else {
            sink.clear();
        }
    }
}

impl Drop for PooledSink {
    fn drop(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if sink.len() <= self.pooled_capacity * 2 {
                sink.clear();
                self.pool.lock().push(sink);
            }
            // else: let the overflow buffer be dropped/deallocated.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_and_return_reuses_allocation() {
        let pool = SinkPool::new(16);
        {
            let mut s = pool.checkout();
            s.get_mut().write_bytes(&[1, 2, 3]);
        }
        let s2 = pool.checkout();
        assert_eq!(s2.get().len(), 0);
    }

    #[test]
    fn overflow_is_not_retained() {
        let pool = SinkPool::new(4);
        {
            let mut s = pool.checkout();
            s.get_mut().write_bytes(&[0u8; 100]);
        }
        // Overflow buffer exceeded 2x pooled capacity and was not returned.
        assert!(pool.inner.lock().is_empty());
    }
}
