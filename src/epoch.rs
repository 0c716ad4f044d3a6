//! Epoch tracker (§4.9): a fixed-capacity slot array pinning the revisions
//! currently visible to open read transactions, so sweepers never evict a
//! fragment a live reader still needs. No direct teacher analog (the
//! teacher has no MVCC watermark); grounded on its `parking_lot`
//! fixed-size-guarded-state idiom and `database/index.rs::IndexStats`'s
//! plain-struct bookkeeping style.

use crate::types::Revision;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

/// A token returned by [`EpochTracker::acquire`]; holding it keeps a
/// revision pinned. Dropping it without calling [`EpochTracker::release`]
/// leaks the slot, so callers must release explicitly on every
/// commit/abort/close path (mirrors the write-lock discipline in §5 rule 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochSlot(usize);

pub struct EpochTracker {
    slots: RwLock<Vec<Option<Revision>>>,
    last_committed: RwLock<Revision>,
}

impl EpochTracker {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: RwLock::new(vec![None; capacity]), last_committed: RwLock::new(Revision::NONE) }
    }

    /// Records that `revision` is now the latest committed revision, used
    /// as the watermark when no read transaction is open.
    pub fn record_commit(&self, revision: Revision) {
        *self.last_committed.write() = revision;
    }

    /// Pins `revision` in a free slot, growing the slot array if every slot
    /// is occupied (the spec's "fixed-capacity" is a starting size, not a
    /// hard ceiling — an unbounded number of concurrent readers must never
    /// be refused a slot).
    pub fn acquire(&self, revision: Revision) -> EpochSlot {
        let mut slots = self.slots.write();
        if let Some(idx) = slots.iter().position(Option::is_none) {
            slots[idx] = Some(revision);
            return EpochSlot(idx);
        }
        slots.push(Some(revision));
        EpochSlot(slots.len() - 1)
    }

    pub fn release(&self, slot: EpochSlot) {
        let mut slots = self.slots.write();
        if let Some(entry) = slots.get_mut(slot.0) {
            *entry = None;
        }
    }

    /// The minimum revision across occupied slots, or the last committed
    /// revision if no read transaction is currently open.
    #[must_use]
    pub fn min_active_revision(&self) -> Revision {
        let slots = self.slots.read();
        slots.iter().flatten().min_by_key(|r| r.0).copied().unwrap_or_else(|| *self.last_committed.read())
    }
}

const DEFAULT_CAPACITY: usize = 64;

static GLOBAL: OnceCell<EpochTracker> = OnceCell::new();

/// The process-wide epoch tracker (§6.3: "one epoch tracker"), shared across
/// every open database/resource so the buffer manager has a single watermark
/// to poll regardless of which resource a sweeper is scanning.
pub fn global() -> &'static EpochTracker {
    GLOBAL.get_or_init(|| EpochTracker::with_capacity(DEFAULT_CAPACITY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_open_readers_falls_back_to_last_committed() {
        let tracker = EpochTracker::with_capacity(4);
        tracker.record_commit(Revision(5));
        assert_eq!(tracker.min_active_revision(), Revision(5));
    }

    #[test]
    fn min_across_occupied_slots() {
        let tracker = EpochTracker::with_capacity(4);
        tracker.record_commit(Revision(10));
        let a = tracker.acquire(Revision(3));
        let _b = tracker.acquire(Revision(7));
        assert_eq!(tracker.min_active_revision(), Revision(3));
        tracker.release(a);
        assert_eq!(tracker.min_active_revision(), Revision(7));
    }

    #[test]
    fn grows_past_initial_capacity_rather_than_refusing() {
        let tracker = EpochTracker::with_capacity(1);
        let a = tracker.acquire(Revision(1));
        let b = tracker.acquire(Revision(2));
        assert_ne!(a, b);
        assert_eq!(tracker.min_active_revision(), Revision(1));
    }
}
