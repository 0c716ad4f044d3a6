//! `LocalDatabase` and the process-wide `Databases` facade (§4.10, §6.3).
//! Grounded on `engine.rs::Engine` (name-keyed registry, one shared storage
//! handle) generalized from a single in-process collection map to the
//! path-indexed, at-most-one-open-session-per-resource registry the spec
//! requires, plus a path-indexed pool of databases one level up.

use crate::config::{DatabaseConfiguration, DatabaseType, ResourceConfiguration};
use crate::epoch::EpochTracker;
use crate::errors::{EngineError, EngineResult};
use crate::io::encryption::ResourceKey;
use crate::io::pipeline::PipelineComponent;
use crate::lifecycle::{ResourceStore, WriteLocksRegistry};
use crate::paths::{DatabasePaths, ResourcePaths};
use crate::session::ResourceSession;
use crate::types::{DatabaseId, ResourceId};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One open database directory: its configuration, a resource-id/name
/// bimap, and the registries that enforce single-writer and
/// at-most-one-open-session semantics for its resources.
pub struct LocalDatabase {
    pub root: PathBuf,
    config: RwLock<DatabaseConfiguration>,
    name_to_id: RwLock<HashMap<String, ResourceId>>,
    id_to_name: RwLock<HashMap<ResourceId, String>>,
    next_resource_id: AtomicU64,
    resource_store: ResourceStore,
    write_locks: WriteLocksRegistry,
}

impl LocalDatabase {
    /// Initializes a fresh database directory: `config.json`, `lock`,
    /// and an empty `data/` directory (§6.1).
    ///
    /// # Errors
    /// Returns [`EngineError::Usage`] if the directory already holds a
    /// database, otherwise propagates IO/JSON failures.
    pub fn create(
        root: &Path,
        database_id: DatabaseId,
        database_name: String,
        database_type: DatabaseType,
    ) -> EngineResult<Arc<Self>> {
        let paths = DatabasePaths::new(root);
        if paths.config_json().exists() {
            return Err(EngineError::Usage(format!(
                "database already exists at {}",
                root.display()
            )));
        }
        std::fs::create_dir_all(paths.data_dir())?;
        std::fs::write(paths.lock_file(), b"")?;
        let config = DatabaseConfiguration {
            database_type,
            database_id,
            database_name,
            max_resource_id: 0,
            max_segment_allocation_size: crate::buffer_manager::DEFAULT_BUDGET_BYTES,
        };
        config.save(&paths.config_json())?;
        Ok(Arc::new(Self {
            root: root.to_path_buf(),
            config: RwLock::new(config),
            name_to_id: RwLock::new(HashMap::new()),
            id_to_name: RwLock::new(HashMap::new()),
            next_resource_id: AtomicU64::new(0),
            resource_store: ResourceStore::new(),
            write_locks: WriteLocksRegistry::new(),
        }))
    }

    /// Opens an existing database directory, loading `config.json` and
    /// discovering already-created resources under `data/` by reading each
    /// resource's own `config.json`.
    ///
    /// # Errors
    /// Propagates IO/JSON failures, including a missing `config.json`.
    pub fn open(root: &Path) -> EngineResult<Arc<Self>> {
        let paths = DatabasePaths::new(root);
        let config = DatabaseConfiguration::load(&paths.config_json())?;
        let mut name_to_id = HashMap::new();
        let mut id_to_name = HashMap::new();
        if let Ok(entries) = std::fs::read_dir(paths.data_dir()) {
            for entry in entries.flatten() {
                let resource_dir = entry.path();
                if !resource_dir.is_dir() {
                    continue;
                }
                let resource_paths = ResourcePaths::new(&resource_dir);
                if let Ok(resource_config) = ResourceConfiguration::load(&resource_paths.config_json()) {
                    let name = resource_config.resource_path.clone();
                    name_to_id.insert(name.clone(), resource_config.resource_id);
                    id_to_name.insert(resource_config.resource_id, name);
                }
            }
        }
        let next_resource_id = config.max_resource_id;
        Ok(Arc::new(Self {
            root: root.to_path_buf(),
            config: RwLock::new(config),
            name_to_id: RwLock::new(name_to_id),
            id_to_name: RwLock::new(id_to_name),
            next_resource_id: AtomicU64::new(next_resource_id),
            resource_store: ResourceStore::new(),
            write_locks: WriteLocksRegistry::new(),
        }))
    }

    #[must_use]
    pub fn database_id(&self) -> DatabaseId {
        self.config.read().database_id
    }

    #[must_use]
    pub fn list_resources(&self) -> Vec<String> {
        self.name_to_id.read().keys().cloned().collect()
    }

    /// Registers a new resource directory (§6.1) and opens its session.
    ///
    /// # Errors
    /// Returns [`EngineError::Usage`] if the name is already registered,
    /// otherwise propagates IO/codec/pipeline failures from creating the
    /// resource's on-disk layout and opening its session.
    pub fn create_resource(
        &self,
        resource_name: &str,
        hash_type: crate::config::HashType,
        byte_handle_pipeline: Vec<PipelineComponent>,
    ) -> EngineResult<Arc<ResourceSession>> {
        if self.name_to_id.read().contains_key(resource_name) {
            return Err(EngineError::Usage(format!("resource {resource_name} already exists")));
        }
        let resource_id = ResourceId(self.next_resource_id.fetch_add(1, Ordering::SeqCst) + 1);
        let database_paths = DatabasePaths::new(&self.root);
        let resource_dir = database_paths.resource_dir(resource_name);
        let resource_paths = ResourcePaths::new(&resource_dir);
        std::fs::create_dir_all(resource_paths.data_dir())?;

        let needs_encryption = byte_handle_pipeline.contains(&PipelineComponent::Encryption);
        let encryption_key = if needs_encryption {
            std::fs::create_dir_all(resource_paths.encryption_key_dir())?;
            let key = ResourceKey::generate();
            std::fs::write(resource_paths.encryption_key_dir().join("key.bin"), key.as_bytes())?;
            Some(key)
        } else {
            None
        };

        let resource_config = ResourceConfiguration {
            resource_id,
            resource_path: resource_name.to_string(),
            hash_type,
            store_child_count: true,
            store_dewey_ids: false,
            custom_commit_timestamps: false,
            byte_handle_pipeline,
            node_hash_function: "sha256-truncated64".to_string(),
            valid_time_config: None,
        };
        resource_config.save(&resource_paths.config_json())?;

        self.name_to_id.write().insert(resource_name.to_string(), resource_id);
        self.id_to_name.write().insert(resource_id, resource_name.to_string());
        self.config.write().max_resource_id = resource_id.0;
        self.config.read().save(&DatabasePaths::new(&self.root).config_json())?;

        let session = ResourceSession::open(
            &resource_paths.resource_data(),
            self.database_id(),
            resource_id,
            resource_config,
            encryption_key,
            self.write_locks.lock_for(&resource_dir),
            Arc::new(EpochTracker::with_capacity(16)),
        )?;
        self.resource_store.insert(resource_dir, Arc::clone(&session));
        Ok(session)
    }

    /// Opens an already-registered resource's session, returning the
    /// already-open instance if one exists (§4.10's "re-opening returns the
    /// existing instance").
    ///
    /// # Errors
    /// Returns [`EngineError::Usage`] for an unknown resource name,
    /// otherwise propagates session-open failures.
    pub fn open_resource(&self, resource_name: &str) -> EngineResult<Arc<ResourceSession>> {
        let resource_id = *self
            .name_to_id
            .read()
            .get(resource_name)
            .ok_or_else(|| EngineError::Usage(format!("no such resource: {resource_name}")))?;
        let resource_dir = DatabasePaths::new(&self.root).resource_dir(resource_name);
        if let Some(existing) = self.resource_store.get(&resource_dir) {
            return Ok(existing);
        }
        let resource_paths = ResourcePaths::new(&resource_dir);
        let resource_config = ResourceConfiguration::load(&resource_paths.config_json())?;
        let encryption_key = if resource_config.byte_handle_pipeline.contains(&PipelineComponent::Encryption) {
            let bytes = std::fs::read(resource_paths.encryption_key_dir().join("key.bin"))?;
            let array: [u8; crate::io::encryption::KEY_LEN] =
                bytes.try_into().map_err(|_| EngineError::CorruptData("encryption key length".into()))?;
            Some(ResourceKey::from_bytes(array))
        } else {
            None
        };
        let session = ResourceSession::open(
            &resource_paths.resource_data(),
            self.database_id(),
            resource_id,
            resource_config,
            encryption_key,
            self.write_locks.lock_for(&resource_dir),
            Arc::new(EpochTracker::with_capacity(16)),
        )?;
        self.resource_store.insert(resource_dir, Arc::clone(&session));
        Ok(session)
    }

    /// Drops this process's handle to a resource's session (§4.10); the
    /// resource itself is untouched on disk.
    pub fn close_resource(&self, resource_name: &str) {
        let resource_dir = DatabasePaths::new(&self.root).resource_dir(resource_name);
        self.resource_store.remove(&resource_dir);
    }

    #[must_use]
    pub fn has_open_sessions(&self) -> bool {
        self.resource_store.contains_any()
    }
}

/// Process-wide facade (§4.10, §6.3): lazily initializes the global buffer
/// manager and epoch tracker on first create/open, and holds the
/// path-indexed pool of open databases. Closing all databases does not
/// tear the globals down; they live until process exit.
pub struct Databases {
    pool: RwLock<HashMap<PathBuf, Arc<LocalDatabase>>>,
    next_database_id: AtomicU64,
}

static DATABASES: OnceCell<Databases> = OnceCell::new();

impl Databases {
    fn ensure_globals_initialized() {
        crate::buffer_manager::init(crate::buffer_manager::DEFAULT_BUDGET_BYTES, || {
            crate::epoch::global().min_active_revision()
        });
    }

    /// The process-wide facade instance.
    pub fn global() -> &'static Databases {
        DATABASES.get_or_init(|| {
            Self::ensure_globals_initialized();
            Databases { pool: RwLock::new(HashMap::new()), next_database_id: AtomicU64::new(0) }
        })
    }

    /// Creates a new database directory and registers it in the pool.
    ///
    /// # Errors
    /// Propagates [`LocalDatabase::create`] failures.
    pub fn create_database(
        &self,
        root: &Path,
        database_name: String,
        database_type: DatabaseType,
    ) -> EngineResult<Arc<LocalDatabase>> {
        let database_id = DatabaseId(self.next_database_id.fetch_add(1, Ordering::SeqCst) + 1);
        let db = LocalDatabase::create(root, database_id, database_name, database_type)?;
        self.pool.write().insert(root.to_path_buf(), Arc::clone(&db));
        Ok(db)
    }

    /// Opens an existing database directory, returning the pool's existing
    /// handle if already open.
    ///
    /// # Errors
    /// Propagates [`LocalDatabase::open`] failures.
    pub fn open_database(&self, root: &Path) -> EngineResult<Arc<LocalDatabase>> {
        if let Some(existing) = self.pool.read().get(root) {
            return Ok(Arc::clone(existing));
        }
        let db = LocalDatabase::open(root)?;
        self.pool.write().insert(root.to_path_buf(), Arc::clone(&db));
        Ok(db)
    }

    /// Drops this process's handle to a database (idempotent: closing an
    /// already-closed or never-opened path is a no-op). Does not tear down
    /// the global buffer manager or epoch tracker (§4.10, §6.3).
    pub fn close_database(&self, root: &Path) {
        self.pool.write().remove(root);
    }

    /// Deletes a database directory from disk. Gated on every resource
    /// session under it being closed first (§5 rule 6's
    /// `sessions.containsAnyEntry(path)` check).
    ///
    /// # Errors
    /// Returns [`EngineError::Contention`] if any resource session is still
    /// open, otherwise propagates IO failures.
    pub fn remove_database(&self, root: &Path) -> EngineResult<()> {
        if let Some(db) = self.pool.read().get(root) {
            if db.has_open_sessions() {
                return Err(EngineError::Contention(format!(
                    "database at {} has open resource sessions",
                    root.display()
                )));
            }
        }
        self.pool.write().remove(root);
        std::fs::remove_dir_all(root)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_then_open_resource_persists_commits() {
        let dir = tempdir().unwrap();
        let facade = Databases::global();
        let db = facade
            .create_database(dir.path(), "mydb".into(), DatabaseType::Json)
            .unwrap();
        let session = db
            .create_resource("articles", crate::config::HashType::Rolled, Vec::new())
            .unwrap();
        let txn = session.begin_write().unwrap();
        txn.commit(None, Some("initial".into())).unwrap();
        db.close_resource("articles");

        let reopened = db.open_resource("articles").unwrap();
        assert_eq!(reopened.current_revision(), crate::types::Revision::FIRST);
        assert_eq!(db.list_resources(), vec!["articles".to_string()]);
    }

    #[test]
    fn remove_database_is_rejected_while_session_is_open() {
        let dir = tempdir().unwrap();
        let facade = Databases::global();
        let root = dir.path().join("gated");
        let db = facade.create_database(&root, "gated".into(), DatabaseType::Xml).unwrap();
        db.create_resource("r", crate::config::HashType::None, Vec::new()).unwrap();
        assert!(facade.remove_database(&root).is_err());
        db.close_resource("r");
        facade.close_database(&root);
        assert!(facade.remove_database(&root).is_ok());
    }
}
