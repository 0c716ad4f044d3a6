//! Process-wide buffer manager (§4.8, §6.3): six typed caches sharing one
//! instance, lazily initialized with a default budget on first use
//! (`getGlobalBufferManager()` in the original terms is [`global`] here).

pub mod keys;
pub mod sweeper;
pub mod typed_cache;

use crate::node::index::RbIndexNode;
use crate::node::name::{NameTableEntry, PathSummaryEntry};
use crate::page::leaf::LeafPage;
use crate::page::revision_root::RevisionRootPage;
use crate::types::{DatabaseId, ResourceId, Revision};
use keys::{
    GenericPageKey, IndexNodeKey, NameTableKey, PathSummaryKey, RecordFragmentKey, RecordPageKey,
    RevisionRootKey,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;
use typed_cache::TypedCache;

/// Default process-wide budget (§6.3), used when no caller has configured
/// one before the first database is created/opened.
pub const DEFAULT_BUDGET_BYTES: u64 = 2 * 1024 * 1024 * 1024;

const SWEEP_INTERVAL: Duration = Duration::from_millis(200);

pub struct BufferManager {
    pub record_pages: Arc<TypedCache<RecordPageKey, LeafPage>>,
    pub record_fragments: Arc<TypedCache<RecordFragmentKey, LeafPage>>,
    pub generic_pages: Arc<TypedCache<GenericPageKey, Vec<u8>>>,
    pub revision_roots: Arc<TypedCache<RevisionRootKey, RevisionRootPage>>,
    pub index_nodes: Arc<TypedCache<IndexNodeKey, RbIndexNode>>,
    pub name_tables: Arc<TypedCache<NameTableKey, NameTableEntry>>,
    pub path_summaries: Arc<TypedCache<PathSummaryKey, Vec<PathSummaryEntry>>>,
    _sweepers: Vec<std::thread::JoinHandle<()>>,
}

impl BufferManager {
    /// Sizes the six caches proportionally to `budget_bytes`, per §4.8's
    /// per-cache weight column (record pages get the full weight, their
    /// fragments half, the rest a small fixed count).
    #[must_use]
    pub fn with_budget(budget_bytes: u64, min_active_revision: impl Fn() -> Revision + Send + Clone + 'static) -> Self {
        let scale = (budget_bytes / (64 * 1024)).max(16) as usize;
        let record_pages = Arc::new(TypedCache::new(scale));
        let record_fragments = Arc::new(TypedCache::new(scale / 2));
        let generic_pages = Arc::new(TypedCache::new(scale / 4));
        let revision_roots = Arc::new(TypedCache::new(64));
        let index_nodes = Arc::new(TypedCache::new(4096));
        let name_tables = Arc::new(TypedCache::new(32));
        let path_summaries = Arc::new(TypedCache::new(32));

        let sweepers = vec![
            sweeper::spawn(&record_pages, min_active_revision.clone(), SWEEP_INTERVAL),
            sweeper::spawn(&record_fragments, min_active_revision.clone(), SWEEP_INTERVAL),
            sweeper::spawn(&generic_pages, min_active_revision.clone(), SWEEP_INTERVAL),
            sweeper::spawn(&revision_roots, min_active_revision.clone(), SWEEP_INTERVAL),
            sweeper::spawn(&index_nodes, min_active_revision.clone(), SWEEP_INTERVAL),
            sweeper::spawn(&name_tables, min_active_revision.clone(), SWEEP_INTERVAL),
            sweeper::spawn(&path_summaries, min_active_revision, SWEEP_INTERVAL),
        ];

        Self {
            record_pages,
            record_fragments,
            generic_pages,
            revision_roots,
            index_nodes,
            name_tables,
            path_summaries,
            _sweepers: sweepers,
        }
    }

    /// Invalidates every entry across all six caches whose key matches
    /// `db_id`/`resource_id` (§4.8's `clearCachesFor`).
    pub fn clear_caches_for(&self, db_id: DatabaseId, resource_id: Option<ResourceId>) {
        self.record_pages.clear_matching(db_id, resource_id);
        self.record_fragments.clear_matching(db_id, resource_id);
        self.generic_pages.clear_matching(db_id, resource_id);
        self.revision_roots.clear_matching(db_id, resource_id);
        self.index_nodes.clear_matching(db_id, resource_id);
        self.name_tables.clear_matching(db_id, resource_id);
        self.path_summaries.clear_matching(db_id, resource_id);
    }
}

static GLOBAL: OnceCell<BufferManager> = OnceCell::new();

/// Returns the process-wide buffer manager, initializing it with
/// [`DEFAULT_BUDGET_BYTES`] and a watermark of always-evictable
/// (`Revision(i32::MAX)`) if nothing has configured it yet. Real callers
/// should prefer [`init`] before the first database open so the epoch
/// tracker's watermark is wired in from the start.
pub fn global() -> &'static BufferManager {
    GLOBAL.get_or_init(|| BufferManager::with_budget(DEFAULT_BUDGET_BYTES, || Revision(i32::MAX)))
}

/// Configures the process-wide buffer manager if it has not been
/// initialized yet; a no-op otherwise (§6.3: "one buffer manager"). Returns
/// whether this call performed the initialization.
pub fn init(budget_bytes: u64, min_active_revision: impl Fn() -> Revision + Send + Clone + 'static) -> bool {
    GLOBAL.set(BufferManager::with_budget(budget_bytes, min_active_revision)).is_ok()
}
