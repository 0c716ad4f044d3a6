//! Buffer-manager cache safety across database boundaries (§4.8): clearing
//! one database's entries must never disturb another's, and a dirty entry
//! must never be evicted out from under a pending flush.

use sirix_core::buffer_manager::BufferManager;
use sirix_core::buffer_manager::keys::NameTableKey;
use sirix_core::database::Databases;
use sirix_core::node::codec::NodeRecord;
use sirix_core::node::delegate::{NodeDelegate, ValueDelegate};
use sirix_core::node::name::NameTableEntry;
use sirix_core::node::value::TextNode;
use sirix_core::types::{DatabaseId, NodeKey, Revision, ResourceId};
use tempfile::tempdir;

#[test]
fn clear_caches_for_is_scoped_to_one_database_across_all_six_caches() {
    let bm = BufferManager::with_budget(4 * 1024 * 1024, || Revision(0));

    let key_a = NameTableKey { db_id: DatabaseId(1), resource_id: ResourceId(1), table_id: 0 };
    let key_b = NameTableKey { db_id: DatabaseId(2), resource_id: ResourceId(1), table_id: 0 };
    bm.name_tables.insert(key_a, NameTableEntry::new(1, "a".into()), Revision(1), false);
    bm.name_tables.insert(key_b, NameTableEntry::new(1, "b".into()), Revision(1), false);

    bm.clear_caches_for(DatabaseId(1), None);

    assert!(bm.name_tables.get(&key_a).is_none());
    assert!(bm.name_tables.get(&key_b).is_some());
}

#[test]
fn dirty_entry_is_never_swept_even_under_memory_pressure() {
    let bm = BufferManager::with_budget(4 * 1024 * 1024, || Revision(i32::MAX));
    let key = NameTableKey { db_id: DatabaseId(1), resource_id: ResourceId(1), table_id: 0 };
    bm.name_tables.insert(key, NameTableEntry::new(1, "staged".into()), Revision(1), true);

    // Repeated sweeps at an always-evictable watermark must still respect
    // the dirty flag.
    for _ in 0..4 {
        bm.name_tables.sweep_one(Revision(i32::MAX));
    }
    assert!(bm.name_tables.get(&key).is_some());

    bm.name_tables.mark_clean(&key);
    assert!(bm.name_tables.sweep_one(Revision(i32::MAX)));
    assert!(bm.name_tables.get(&key).is_none());
}

#[test]
fn repeated_node_reads_hit_the_process_wide_record_page_cache() {
    let dir = tempdir().unwrap();
    let db = Databases::global()
        .create_database(dir.path(), "cache-wiring".into(), sirix_core::config::DatabaseType::Json)
        .unwrap();
    let session = db.create_resource("doc", sirix_core::config::HashType::Rolled, Vec::new()).unwrap();

    let mut txn = session.begin_write().unwrap();
    txn.put_node(&NodeRecord::Text(TextNode {
        node: NodeDelegate::new(NodeKey(1), NodeKey::NULL, Revision::FIRST),
        left_sibling_key: NodeKey::NULL,
        right_sibling_key: NodeKey::NULL,
        value: ValueDelegate::new(b"cached".to_vec(), false),
    }))
    .unwrap();
    let record_pages_ref = txn.flush_nodes().unwrap();
    txn.commit(record_pages_ref, None).unwrap();

    let bm = sirix_core::buffer_manager::global();
    let (_, misses_before, _) = bm.record_pages.stats();

    let reader = session.begin_read();
    reader.get_node(NodeKey(1)).unwrap().unwrap(); // first read: miss, populates the cache
    let (hits_after_first, misses_after_first, _) = bm.record_pages.stats();
    assert_eq!(misses_after_first, misses_before + 1);

    reader.get_node(NodeKey(1)).unwrap().unwrap(); // second read: cache hit
    let (hits_after_second, _, _) = bm.record_pages.stats();
    assert!(hits_after_second > hits_after_first);
}

#[test]
fn only_the_first_init_call_in_this_process_configures_the_global() {
    // Each integration test file is its own binary, so nothing else in this
    // process has touched the global buffer manager yet; exactly one of the
    // two calls below wins the race to configure it.
    let first = sirix_core::buffer_manager::init(1024 * 1024, || Revision(0));
    let second = sirix_core::buffer_manager::init(2048 * 1024, || Revision(0));
    assert_ne!(first, second);
}
