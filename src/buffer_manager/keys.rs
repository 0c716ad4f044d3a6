//! Cache key types for the six typed caches (§4.8). Every key embeds a
//! `(database-id, resource-id)` prefix (or just `resource-id`/none, for the
//! caches whose scope is coarser) so `clear_caches_for` can invalidate by
//! prefix match without the cache needing to know each key's internal
//! shape.

use crate::page::PageRef;
use crate::types::{DatabaseId, ResourceId, Revision};

pub trait CacheKey: std::hash::Hash + Eq + Clone + Send + Sync + 'static {
    /// True if this key belongs to `db_id` (and, when given, `resource_id`).
    fn matches_prefix(&self, db_id: DatabaseId, resource_id: Option<ResourceId>) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordPageKey {
    pub db_id: DatabaseId,
    pub resource_id: ResourceId,
    pub page_ref: PageRef,
}

impl CacheKey for RecordPageKey {
    fn matches_prefix(&self, db_id: DatabaseId, resource_id: Option<ResourceId>) -> bool {
        self.db_id == db_id && resource_id.is_none_or(|r| r == self.resource_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordFragmentKey {
    pub db_id: DatabaseId,
    pub resource_id: ResourceId,
    pub page_ref: PageRef,
    pub fragment_index: u32,
}

impl CacheKey for RecordFragmentKey {
    fn matches_prefix(&self, db_id: DatabaseId, resource_id: Option<ResourceId>) -> bool {
        self.db_id == db_id && resource_id.is_none_or(|r| r == self.resource_id)
    }
}

/// Generic pages are addressed by `page_ref` alone (index/path-summary
/// pages not already covered by a more specific cache); scoped to a
/// resource so eviction-by-prefix still works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenericPageKey {
    pub db_id: DatabaseId,
    pub resource_id: ResourceId,
    pub page_ref: PageRef,
}

impl CacheKey for GenericPageKey {
    fn matches_prefix(&self, db_id: DatabaseId, resource_id: Option<ResourceId>) -> bool {
        self.db_id == db_id && resource_id.is_none_or(|r| r == self.resource_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevisionRootKey {
    pub db_id: DatabaseId,
    pub resource_id: ResourceId,
    pub revision: Revision,
}

impl CacheKey for RevisionRootKey {
    fn matches_prefix(&self, db_id: DatabaseId, resource_id: Option<ResourceId>) -> bool {
        self.db_id == db_id && resource_id.is_none_or(|r| r == self.resource_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexNodeKey {
    pub db_id: DatabaseId,
    pub resource_id: ResourceId,
    /// Opaque typed-key bytes (the index's own encoded sort key).
    pub typed_key: Vec<u8>,
}

impl CacheKey for IndexNodeKey {
    fn matches_prefix(&self, db_id: DatabaseId, resource_id: Option<ResourceId>) -> bool {
        self.db_id == db_id && resource_id.is_none_or(|r| r == self.resource_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameTableKey {
    pub db_id: DatabaseId,
    pub resource_id: ResourceId,
    pub table_id: u32,
}

impl CacheKey for NameTableKey {
    fn matches_prefix(&self, db_id: DatabaseId, resource_id: Option<ResourceId>) -> bool {
        self.db_id == db_id && resource_id.is_none_or(|r| r == self.resource_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathSummaryKey {
    pub db_id: DatabaseId,
    pub resource_id: ResourceId,
}

impl CacheKey for PathSummaryKey {
    fn matches_prefix(&self, db_id: DatabaseId, resource_id: Option<ResourceId>) -> bool {
        self.db_id == db_id && resource_id.is_none_or(|r| r == self.resource_id)
    }
}
