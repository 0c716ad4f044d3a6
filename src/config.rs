//! Database/resource configuration (§4.11, §6.2): persisted as
//! `config.json`, pretty-printed, matching the teacher's
//! `engine.rs::save_indexes_metadata` convention of `serde_json::to_vec_pretty`.
//! `#[serde(default)]` fields let older configs keep parsing as new fields
//! are added, mirroring `engine.rs::load_indexes_metadata`'s tolerant
//! fallback.

use crate::io::pipeline::PipelineComponent;
use crate::types::{DatabaseId, ResourceId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseType {
    Xml,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfiguration {
    pub database_type: DatabaseType,
    pub database_id: DatabaseId,
    pub database_name: String,
    #[serde(default)]
    pub max_resource_id: u64,
    /// Memory budget in bytes (§6.2 `maxSegmentAllocationSize`).
    #[serde(default = "default_max_segment_allocation_size")]
    pub max_segment_allocation_size: u64,
}

const fn default_max_segment_allocation_size() -> u64 {
    crate::buffer_manager::DEFAULT_BUDGET_BYTES
}

impl DatabaseConfiguration {
    /// Reads and parses a database's `config.json`.
    ///
    /// # Errors
    /// Propagates IO and JSON decode errors.
    pub fn load(path: &std::path::Path) -> crate::errors::EngineResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Writes `config.json`, pretty-printed.
    ///
    /// # Errors
    /// Propagates IO and JSON encode errors.
    pub fn save(&self, path: &std::path::Path) -> crate::errors::EngineResult<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashType {
    None,
    Rolled,
    Postorder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidTimeConfig {
    pub valid_from_path: Option<String>,
    pub valid_to_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfiguration {
    pub resource_id: ResourceId,
    pub resource_path: String,
    #[serde(default = "default_hash_type")]
    pub hash_type: HashType,
    #[serde(default = "default_true")]
    pub store_child_count: bool,
    #[serde(default)]
    pub store_dewey_ids: bool,
    #[serde(default)]
    pub custom_commit_timestamps: bool,
    #[serde(default)]
    pub byte_handle_pipeline: Vec<PipelineComponent>,
    #[serde(default = "default_node_hash_function")]
    pub node_hash_function: String,
    #[serde(default)]
    pub valid_time_config: Option<ValidTimeConfig>,
}

const fn default_hash_type() -> HashType {
    HashType::Rolled
}

const fn default_true() -> bool {
    true
}

fn default_node_hash_function() -> String {
    "sha256-truncated64".to_string()
}

impl ResourceConfiguration {
    /// # Errors
    /// Propagates IO and JSON decode errors.
    pub fn load(path: &std::path::Path) -> crate::errors::EngineResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// # Errors
    /// Propagates IO and JSON encode errors.
    pub fn save(&self, path: &std::path::Path) -> crate::errors::EngineResult<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_configuration_round_trips_through_json() {
        let cfg = DatabaseConfiguration {
            database_type: DatabaseType::Json,
            database_id: DatabaseId(1),
            database_name: "mydb".into(),
            max_resource_id: 0,
            max_segment_allocation_size: crate::buffer_manager::DEFAULT_BUDGET_BYTES,
        };
        let tmp = tempfile::NamedTempFile::new().unwrap();
        cfg.save(tmp.path()).unwrap();
        let loaded = DatabaseConfiguration::load(tmp.path()).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn resource_configuration_tolerates_missing_fields() {
        let minimal = serde_json::json!({
            "resource_id": 1,
            "resource_path": "foo",
        });
        let parsed: ResourceConfiguration = serde_json::from_value(minimal).unwrap();
        assert_eq!(parsed.hash_type, HashType::Rolled);
        assert!(parsed.store_child_count);
        assert!(!parsed.store_dewey_ids);
    }
}
