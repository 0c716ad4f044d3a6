//! Resource session (§4.10): owns the IO storage, the uber page, the
//! per-resource write lock, and the live read/write transactions against
//! one resource. Grounded on `engine.rs::Engine` (single shared storage
//! handle behind the session, collection-style registry one level up in
//! [`crate::database`]), generalized from an in-process collection map to
//! the path-indexed, at-most-one-open-session semantics the spec requires.

use crate::buffer_manager::keys::{RecordPageKey, RevisionRootKey};
use crate::config::ResourceConfiguration;
use crate::epoch::{EpochSlot, EpochTracker};
use crate::errors::EngineResult;
use crate::io::encryption::ResourceKey;
use crate::io::pipeline::BytePipeline;
use crate::io::storage::IoStorage;
use crate::lifecycle::{WriteLock, WriteLockGuard};
use crate::node::codec::NodeRecord;
use crate::page::leaf::LeafPage;
use crate::page::record_page::{self, RecordPageDirectory};
use crate::page::revision_root::RevisionRootPage;
use crate::page::uber::UberPage;
use crate::page::PageRef;
use crate::types::{DatabaseId, NodeKey, Revision, ResourceId};
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single open resource: its append log, its current root, and the
/// machinery needed to admit exactly one writer and any number of readers
/// (§5 rules 1-2).
pub struct ResourceSession {
    pub database_id: DatabaseId,
    pub resource_id: ResourceId,
    pub resource_config: ResourceConfiguration,
    storage_path: PathBuf,
    storage: Mutex<IoStorage>,
    uber: RwLock<UberPage>,
    pipeline: BytePipeline,
    encryption_key: Option<ResourceKey>,
    write_lock: Arc<WriteLock>,
    epoch: Arc<EpochTracker>,
}

impl ResourceSession {
    /// Opens (creating if new) the resource's append log at
    /// `<resource-dir>/data/resource.data` and reads or initializes its
    /// uber page.
    ///
    /// # Errors
    /// Propagates IO, codec, and pipeline failures.
    pub fn open(
        storage_path: &Path,
        database_id: DatabaseId,
        resource_id: ResourceId,
        resource_config: ResourceConfiguration,
        encryption_key: Option<ResourceKey>,
        write_lock: Arc<WriteLock>,
        epoch: Arc<EpochTracker>,
    ) -> EngineResult<Arc<Self>> {
        let pipeline = BytePipeline { components: resource_config.byte_handle_pipeline.clone() };
        let mut storage = IoStorage::open(storage_path)?;
        storage.verify_header()?;

        let uber = match storage.read_uber_slot()? {
            Some(revision_root_ref) => {
                let encoded = storage.read_page(revision_root_ref)?;
                let decoded = pipeline.decode(&encoded, encryption_key.as_ref())?;
                let (root, _): (RevisionRootPage, usize) = decode_from_slice(&decoded, standard())?;
                UberPage { revision_root_ref: Some(revision_root_ref), max_revision: root.revision, log_append_offset: 0 }
            }
            // A brand-new resource mints no revision of its own (§8 S1):
            // the uber slot stays untouched until a caller actually runs
            // the commit protocol via `begin_write`/`commit`.
            None => UberPage::uninitialized(),
        };
        epoch.record_commit(uber.max_revision);

        Ok(Arc::new(Self {
            database_id,
            resource_id,
            resource_config,
            storage_path: storage_path.to_path_buf(),
            storage: Mutex::new(storage),
            uber: RwLock::new(uber),
            pipeline,
            encryption_key,
            write_lock,
            epoch,
        }))
    }

    #[must_use]
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    #[must_use]
    pub fn current_revision(&self) -> Revision {
        self.uber.read().max_revision
    }

    /// Decodes and returns the revision root page the uber page currently
    /// points at, or an in-memory empty one pinned at [`Revision::NONE`] if
    /// the resource has never had a revision committed yet.
    ///
    /// # Errors
    /// Propagates IO, pipeline, and codec failures.
    pub fn current_revision_root(&self) -> EngineResult<RevisionRootPage> {
        let uber = *self.uber.read();
        match uber.revision_root_ref {
            Some(page_ref) => self.read_revision_root_cached(page_ref, uber.max_revision),
            None => Ok(RevisionRootPage::empty(Revision::NONE, Utc::now().timestamp_millis())),
        }
    }

    /// Reads the revision root at `page_ref`, going through the buffer
    /// manager's `revision_roots` cache keyed by `revision` (§4.8) so a
    /// reopened or repeatedly-read revision root is decoded from storage
    /// only once per eviction cycle.
    fn read_revision_root_cached(&self, page_ref: PageRef, revision: Revision) -> EngineResult<RevisionRootPage> {
        let key = RevisionRootKey { db_id: self.database_id, resource_id: self.resource_id, revision };
        let bm = crate::buffer_manager::global();
        if let Some(root) = bm.revision_roots.get(&key) {
            return Ok(root);
        }
        let root = self.read_revision_root(page_ref)?;
        bm.revision_roots.insert(key, root.clone(), Revision::NONE, false);
        Ok(root)
    }

    fn read_revision_root(&self, page_ref: PageRef) -> EngineResult<RevisionRootPage> {
        let encoded = self.storage.lock().read_page(page_ref)?;
        let decoded = self.pipeline.decode(&encoded, self.encryption_key.as_ref())?;
        let (root, _) = decode_from_slice(&decoded, standard())?;
        Ok(root)
    }

    /// Decodes a [`RecordPageDirectory`] blob previously produced by
    /// [`WriteTransaction::flush_nodes`].
    fn read_record_directory(&self, page_ref: PageRef) -> EngineResult<RecordPageDirectory> {
        let encoded = self.storage.lock().read_page(page_ref)?;
        let decoded = self.pipeline.decode(&encoded, self.encryption_key.as_ref())?;
        let (directory, _) = decode_from_slice(&decoded, standard())?;
        Ok(directory)
    }

    /// Decodes a [`LeafPage`] blob previously produced by
    /// [`WriteTransaction::flush_nodes`], going through the buffer
    /// manager's `record_pages` cache (§4.8). Leaf pages are immutable once
    /// written (copy-on-write), so a cached entry is always safe to evict:
    /// it stays keyed at [`Revision::NONE`], the lowest watermark, meaning
    /// "evict whenever nothing is referencing it."
    fn read_leaf_page(&self, page_ref: PageRef) -> EngineResult<LeafPage> {
        let key = RecordPageKey { db_id: self.database_id, resource_id: self.resource_id, page_ref };
        let bm = crate::buffer_manager::global();
        if let Some(page) = bm.record_pages.get(&key) {
            return Ok(page);
        }
        let encoded = self.storage.lock().read_page(page_ref)?;
        let decoded = self.pipeline.decode(&encoded, self.encryption_key.as_ref())?;
        let (page, _): (LeafPage, usize) = decode_from_slice(&decoded, standard())?;
        bm.record_pages.insert(key, page.clone(), Revision::NONE, false);
        Ok(page)
    }

    /// Looks up a node record as visible under `record_pages_ref` (the
    /// committed directory reference carried in a revision root), loading
    /// only the directory and the one owning leaf page.
    ///
    /// # Errors
    /// Propagates IO, pipeline, and codec failures.
    fn lookup_node(
        &self,
        record_pages_ref: Option<PageRef>,
        key: NodeKey,
    ) -> EngineResult<Option<NodeRecord>> {
        let Some(directory_ref) = record_pages_ref else {
            return Ok(None);
        };
        let directory = self.read_record_directory(directory_ref)?;
        let (page_number, slot) = record_page::locate(key);
        let Some(page_ref) = directory.get(page_number) else {
            return Ok(None);
        };
        let page = self.read_leaf_page(page_ref)?;
        Ok(record_page::get_node(&page, page_number, slot)?)
    }

    /// Pins the currently visible committed revision and returns a handle
    /// readers hold for the lifetime of their transaction (§4.9, §5 rule 2).
    #[must_use]
    pub fn begin_read(self: &Arc<Self>) -> ReadTransaction {
        let uber = *self.uber.read();
        let slot = self.epoch.acquire(uber.max_revision);
        ReadTransaction {
            session: Arc::clone(self),
            revision: uber.max_revision,
            page_ref: uber.revision_root_ref,
            slot: Some(slot),
        }
    }

    /// Blocks until the per-resource write permit is free, then opens a
    /// staging view over the currently committed revision root (§4.7 steps
    /// 1-2, §5 rule 1).
    ///
    /// # Errors
    /// Propagates failure to read the base revision root.
    pub fn begin_write(self: &Arc<Self>) -> EngineResult<WriteTransaction> {
        let guard = self.write_lock.acquire();
        let base = self.current_revision_root()?;
        let directory = match base.record_pages_ref {
            Some(page_ref) => self.read_record_directory(page_ref)?,
            None => RecordPageDirectory::default(),
        };
        Ok(WriteTransaction {
            session: Arc::clone(self),
            _guard: guard,
            base,
            pending_page_refs: Vec::new(),
            directory,
            dirty_pages: HashMap::new(),
        })
    }
}

/// A read-only snapshot pinned at a fixed revision. Readers observe every
/// record published at revisions `<= revision` (§5 rule 5) and never block
/// the writer.
pub struct ReadTransaction {
    session: Arc<ResourceSession>,
    revision: Revision,
    page_ref: Option<PageRef>,
    slot: Option<EpochSlot>,
}

impl ReadTransaction {
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }

    /// Reads the revision root pinned at transaction open, independent of
    /// any commit that publishes a later revision afterward (§5 rule 5).
    ///
    /// # Errors
    /// Propagates IO, pipeline, and codec failures.
    pub fn revision_root(&self) -> EngineResult<RevisionRootPage> {
        match self.page_ref {
            Some(page_ref) => self.session.read_revision_root_cached(page_ref, self.revision),
            None => Ok(RevisionRootPage::empty(Revision::NONE, 0)),
        }
    }

    /// Reads a single node record as it stood at the pinned revision.
    ///
    /// # Errors
    /// Propagates IO, pipeline, and codec failures.
    pub fn get_node(&self, key: NodeKey) -> EngineResult<Option<NodeRecord>> {
        let root = self.revision_root()?;
        self.session.lookup_node(root.record_pages_ref, key)
    }

    /// Walks the document-order chain starting at `first`, following
    /// `right_sibling_key` until it hits `NodeKey::NULL` (§3.2's sibling
    /// chain). Stops early (returning what it has read so far) if a key in
    /// the chain is not found, which should not happen for a consistent
    /// revision.
    ///
    /// # Errors
    /// Propagates IO, pipeline, and codec failures.
    pub fn siblings_from(&self, first: NodeKey) -> EngineResult<Vec<NodeRecord>> {
        let root = self.revision_root()?;
        let mut out = Vec::new();
        let mut next = first;
        while next != NodeKey::NULL {
            let Some(record) = self.session.lookup_node(root.record_pages_ref, next)? else {
                break;
            };
            next = match &record {
                NodeRecord::Text(n) => n.right_sibling_key,
                NodeRecord::Comment(n) => n.right_sibling_key,
                NodeRecord::Element(n) => n.structure.right_sibling_key,
                NodeRecord::Object(n) | NodeRecord::Array(n) => n.structure.right_sibling_key,
                NodeRecord::ObjectKey(n) => n.structure.right_sibling_key,
                NodeRecord::DocumentRoot(n) | NodeRecord::JsonDocumentRoot(n) => n.structure.right_sibling_key,
                _ => NodeKey::NULL,
            };
            out.push(record);
        }
        Ok(out)
    }
}

impl Drop for ReadTransaction {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.session.epoch.release(slot);
        }
    }
}

/// The staging view a write transaction accumulates before publishing it
/// at commit (§4.7 steps 2-5, glossary "staging view"). Holding this value
/// implies holding the resource's write permit.
pub struct WriteTransaction {
    session: Arc<ResourceSession>,
    _guard: WriteLockGuard,
    base: RevisionRootPage,
    pending_page_refs: Vec<PageRef>,
    directory: RecordPageDirectory,
    /// Leaf pages touched this transaction, keyed by page number. Any page
    /// number absent here and carried forward unchanged in `directory`
    /// preserves copy-on-write: it is never re-read or re-written.
    dirty_pages: HashMap<u64, LeafPage>,
}

impl WriteTransaction {
    #[must_use]
    pub fn base_revision_root(&self) -> &RevisionRootPage {
        &self.base
    }

    fn ensure_page_loaded(&mut self, page_number: u64) -> EngineResult<()> {
        if self.dirty_pages.contains_key(&page_number) {
            return Ok(());
        }
        let page = match self.directory.get(page_number) {
            Some(page_ref) => self.session.read_leaf_page(page_ref)?,
            None => LeafPage::with_capacity(record_page::RECORD_PAGE_FAN_OUT as usize),
        };
        self.dirty_pages.insert(page_number, page);
        Ok(())
    }

    /// Stages `record` into its owning leaf page (§4.4: addressed by the
    /// low-order bits of its node key), to be written out by
    /// [`Self::flush_nodes`]. Does not touch the append log directly.
    ///
    /// # Errors
    /// Propagates IO, pipeline, and codec failures from loading the page the
    /// record belongs to, if it is not already staged.
    pub fn put_node(&mut self, record: &NodeRecord) -> EngineResult<()> {
        let (page_number, slot) = record_page::locate(record.node_key());
        self.ensure_page_loaded(page_number)?;
        let page = self.dirty_pages.get_mut(&page_number).expect("just loaded");
        record_page::put_node(page, slot, record);
        Ok(())
    }

    /// Reads a node record as it stands in this transaction's staging view,
    /// reflecting any prior [`Self::put_node`] calls this transaction made
    /// even before they are flushed or committed.
    ///
    /// # Errors
    /// Propagates IO, pipeline, and codec failures.
    pub fn get_node(&mut self, key: NodeKey) -> EngineResult<Option<NodeRecord>> {
        let (page_number, slot) = record_page::locate(key);
        if let Some(page) = self.dirty_pages.get(&page_number) {
            return Ok(record_page::get_node(page, page_number, slot)?);
        }
        let Some(page_ref) = self.directory.get(page_number) else {
            return Ok(None);
        };
        let page = self.session.read_leaf_page(page_ref)?;
        Ok(record_page::get_node(&page, page_number, slot)?)
    }

    /// Writes every dirty leaf page and, if any were touched, a fresh
    /// directory blob to the append log, returning the reference to pass
    /// into [`Self::commit`]. Returns the base revision root's existing
    /// `record_pages_ref` unchanged if no node was staged this transaction
    /// (copy-on-write: an untouched directory is never rewritten).
    ///
    /// # Errors
    /// Propagates pipeline and IO failures.
    pub fn flush_nodes(&mut self) -> EngineResult<Option<PageRef>> {
        if self.dirty_pages.is_empty() {
            return Ok(self.base.record_pages_ref);
        }
        for (&page_number, page) in std::mem::take(&mut self.dirty_pages) {
            let encoded = encode_to_vec(&page, standard())?;
            let page_ref = self.write_page(&encoded)?;
            self.directory.set(page_number, page_ref);
        }
        let encoded = encode_to_vec(&self.directory, standard())?;
        let directory_ref = self.write_page(&encoded)?;
        Ok(Some(directory_ref))
    }

    /// Appends an already-serialized page to the log in staging order
    /// (caller is responsible for writing dependents before dependers, per
    /// §4.7 step 3: leaves before parents). Not visible to any reader until
    /// [`Self::commit`] succeeds.
    ///
    /// # Errors
    /// Propagates pipeline and IO failures.
    pub fn write_page(&mut self, bytes: &[u8]) -> EngineResult<PageRef> {
        let sealed = self.session.pipeline.encode(bytes, self.session.encryption_key.as_ref())?;
        let page_ref = self.session.storage.lock().append_page(&sealed)?;
        self.pending_page_refs.push(page_ref);
        Ok(page_ref)
    }

    /// Publishes the staged pages: writes the new revision root, `fsync`s,
    /// and atomically overwrites the uber slot (§4.7 steps 5-7). Passing
    /// `None` for any `*_ref` carries the base revision root's existing
    /// reference forward unchanged, so a transaction that stages nothing
    /// still produces a valid new revision (an empty commit).
    ///
    /// # Errors
    /// Propagates pipeline, codec, and IO failures. On error the write lock
    /// is still released when the transaction is dropped; no partial state
    /// is published.
    pub fn commit(
        self,
        record_pages_ref: Option<PageRef>,
        commit_message: Option<String>,
    ) -> EngineResult<Revision> {
        let new_revision =
            if self.base.revision.is_none() { Revision::FIRST } else { self.base.revision.next() };
        let root = RevisionRootPage {
            revision: new_revision,
            commit_timestamp_millis: Utc::now().timestamp_millis(),
            commit_message,
            record_pages_ref: record_pages_ref.or(self.base.record_pages_ref),
            cas_index_ref: self.base.cas_index_ref,
            path_index_ref: self.base.path_index_ref,
            name_index_ref: self.base.name_index_ref,
            value_index_ref: self.base.value_index_ref,
            path_summary_ref: self.base.path_summary_ref,
        };
        let encoded = encode_to_vec(&root, standard())?;
        let sealed = self.session.pipeline.encode(&encoded, self.session.encryption_key.as_ref())?;

        let mut storage = self.session.storage.lock();
        let revision_root_ref = storage.append_page(&sealed)?;
        storage.fsync()?;
        storage.commit_uber_slot(revision_root_ref)?;
        drop(storage);

        *self.session.uber.write() =
            UberPage { revision_root_ref: Some(revision_root_ref), max_revision: new_revision, log_append_offset: 0 };
        self.session.epoch.record_commit(new_revision);
        Ok(new_revision)
    }

    /// Abandons the staging log before publication (§4.7's rollback: the
    /// appended-but-unreferenced bytes become unreachable garbage,
    /// reclaimable by later compaction, not mandated here).
    pub fn abort(self) {}
}
