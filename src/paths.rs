//! On-disk layout enumeration (§4.11, §6.1). Grounded on the teacher's
//! diagnostics style (`recovery/wasp/consistency.rs::ConsistencyReport`):
//! `compare_structure` reports the first mismatch rather than a bare bool.

use std::path::{Path, PathBuf};

/// Whether a path is expected to be a directory or a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}

/// The first structural problem `compare_structure` finds, or `None` if
/// every expected entry is present with the expected kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureMismatch {
    pub path: PathBuf,
    pub expected: EntryKind,
    pub problem: MismatchProblem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchProblem {
    Missing,
    WrongKind,
}

fn check_entry(path: &Path, expected: EntryKind) -> Option<StructureMismatch> {
    if !path.exists() {
        return Some(StructureMismatch { path: path.to_path_buf(), expected, problem: MismatchProblem::Missing });
    }
    let actual_is_dir = path.is_dir();
    let matches = match expected {
        EntryKind::Dir => actual_is_dir,
        EntryKind::File => !actual_is_dir,
    };
    (!matches)
        .then(|| StructureMismatch { path: path.to_path_buf(), expected, problem: MismatchProblem::WrongKind })
}

/// Per-database layout, per §6.1:
/// ```text
/// <database-dir>/
///   config.json
///   lock
///   data/
/// ```
pub struct DatabasePaths {
    pub root: PathBuf,
}

impl DatabasePaths {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn config_json(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Presence file removed on close (§6.1), gating destructive operations
    /// per §5 rule 6.
    #[must_use]
    pub fn lock_file(&self) -> PathBuf {
        self.root.join("lock")
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    #[must_use]
    pub fn resource_dir(&self, resource_name: &str) -> PathBuf {
        self.data_dir().join(resource_name)
    }

    /// Returns the first entry missing or of the wrong kind, scanning in
    /// layout order; `None` means the database directory is well-formed.
    #[must_use]
    pub fn compare_structure(&self) -> Option<StructureMismatch> {
        check_entry(&self.root, EntryKind::Dir)
            .or_else(|| check_entry(&self.config_json(), EntryKind::File))
            .or_else(|| check_entry(&self.data_dir(), EntryKind::Dir))
    }
}

/// Per-resource layout, per §6.1:
/// ```text
/// <resource-name>/
///   config.json
///   data/
///     resource.data
///   encryption-key/   (optional)
///   path-summary/…
///   indexes/…
/// ```
pub struct ResourcePaths {
    pub root: PathBuf,
}

impl ResourcePaths {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn config_json(&self) -> PathBuf {
        self.root.join("config.json")
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    #[must_use]
    pub fn resource_data(&self) -> PathBuf {
        self.data_dir().join("resource.data")
    }

    #[must_use]
    pub fn encryption_key_dir(&self) -> PathBuf {
        self.root.join("encryption-key")
    }

    #[must_use]
    pub fn path_summary_dir(&self) -> PathBuf {
        self.root.join("path-summary")
    }

    #[must_use]
    pub fn indexes_dir(&self) -> PathBuf {
        self.root.join("indexes")
    }

    /// `encryption-key/` is optional (only present when the byte pipeline
    /// includes encryption), so it is not checked here.
    #[must_use]
    pub fn compare_structure(&self) -> Option<StructureMismatch> {
        check_entry(&self.root, EntryKind::Dir)
            .or_else(|| check_entry(&self.config_json(), EntryKind::File))
            .or_else(|| check_entry(&self.data_dir(), EntryKind::Dir))
            .or_else(|| check_entry(&self.resource_data(), EntryKind::File))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn well_formed_database_has_no_mismatch() {
        let dir = tempdir().unwrap();
        let paths = DatabasePaths::new(dir.path());
        std::fs::write(paths.config_json(), b"{}").unwrap();
        std::fs::create_dir_all(paths.data_dir()).unwrap();
        assert_eq!(paths.compare_structure(), None);
    }

    #[test]
    fn missing_config_is_reported_first() {
        let dir = tempdir().unwrap();
        let paths = DatabasePaths::new(dir.path());
        std::fs::create_dir_all(paths.data_dir()).unwrap();
        let mismatch = paths.compare_structure().unwrap();
        assert_eq!(mismatch.path, paths.config_json());
        assert_eq!(mismatch.problem, MismatchProblem::Missing);
    }

    #[test]
    fn wrong_kind_is_detected() {
        let dir = tempdir().unwrap();
        let paths = DatabasePaths::new(dir.path());
        // config.json is a directory instead of a file.
        std::fs::create_dir_all(paths.config_json()).unwrap();
        std::fs::create_dir_all(paths.data_dir()).unwrap();
        let mismatch = paths.compare_structure().unwrap();
        assert_eq!(mismatch.problem, MismatchProblem::WrongKind);
    }
}
