//! Single-writer and single-open-session invariants (§5 rules 1 and 6).

use sirix_core::database::Databases;
use sirix_core::errors::EngineError;
use tempfile::tempdir;

#[test]
fn reopening_an_already_open_resource_returns_the_same_session() {
    let dir = tempdir().unwrap();
    let db = Databases::global()
        .create_database(dir.path(), "reopen".into(), sirix_core::config::DatabaseType::Json)
        .unwrap();
    let first = db.create_resource("doc", sirix_core::config::HashType::Rolled, Vec::new()).unwrap();
    let second = db.open_resource("doc").unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn creating_a_resource_with_a_name_already_in_use_is_rejected() {
    let dir = tempdir().unwrap();
    let db = Databases::global()
        .create_database(dir.path(), "dupe".into(), sirix_core::config::DatabaseType::Json)
        .unwrap();
    db.create_resource("doc", sirix_core::config::HashType::Rolled, Vec::new()).unwrap();
    let err = db.create_resource("doc", sirix_core::config::HashType::Rolled, Vec::new()).unwrap_err();
    assert!(matches!(err, EngineError::Usage(_)));
}

#[test]
fn opening_an_unregistered_resource_name_is_rejected() {
    let dir = tempdir().unwrap();
    let db = Databases::global()
        .create_database(dir.path(), "unknown".into(), sirix_core::config::DatabaseType::Json)
        .unwrap();
    let err = db.open_resource("does-not-exist").unwrap_err();
    assert!(matches!(err, EngineError::Usage(_)));
}

#[test]
fn creating_a_database_twice_at_the_same_path_is_rejected() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("once");
    Databases::global()
        .create_database(&root, "once".into(), sirix_core::config::DatabaseType::Xml)
        .unwrap();
    let err = sirix_core::LocalDatabase::create(
        &root,
        sirix_core::types::DatabaseId(999),
        "once-again".into(),
        sirix_core::config::DatabaseType::Xml,
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Usage(_)));
}
