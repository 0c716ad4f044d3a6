//! MVCC isolation (§4.9, §5 rule 5): a reader pinned at revision N never
//! observes a record published by a commit at revision N+1, even if that
//! commit touches the very node key the reader is looking up.

use sirix_core::database::Databases;
use sirix_core::node::codec::NodeRecord;
use sirix_core::node::delegate::{NodeDelegate, StructDelegate, ValueDelegate};
use sirix_core::node::value::TextNode;
use sirix_core::types::{NodeKey, Revision};
use tempfile::tempdir;

fn text(key: i64, text: &str) -> NodeRecord {
    NodeRecord::Text(TextNode {
        node: NodeDelegate::new(NodeKey(key), NodeKey::NULL, Revision::FIRST),
        left_sibling_key: NodeKey::NULL,
        right_sibling_key: NodeKey::NULL,
        value: ValueDelegate::new(text.as_bytes().to_vec(), false),
    })
}

#[test]
fn reader_pinned_before_a_commit_does_not_see_it_afterward() {
    let dir = tempdir().unwrap();
    let db = Databases::global()
        .create_database(dir.path(), "mvcc".into(), sirix_core::config::DatabaseType::Json)
        .unwrap();
    let session = db.create_resource("doc", sirix_core::config::HashType::Rolled, Vec::new()).unwrap();

    let mut txn = session.begin_write().unwrap();
    txn.put_node(&text(1, "v1")).unwrap();
    let record_pages_ref = txn.flush_nodes().unwrap();
    txn.commit(record_pages_ref, None).unwrap();

    let reader = session.begin_read();
    assert_eq!(reader.revision(), Revision::FIRST);

    let mut txn2 = session.begin_write().unwrap();
    txn2.put_node(&text(1, "v2")).unwrap();
    let record_pages_ref = txn2.flush_nodes().unwrap();
    txn2.commit(record_pages_ref, None).unwrap();

    // The already-open reader still sees the value as of its own pin.
    if let NodeRecord::Text(t) = reader.get_node(NodeKey(1)).unwrap().unwrap() {
        assert_eq!(t.value.raw_value, b"v1");
    } else {
        panic!("expected text node");
    }

    // A fresh reader opened after the second commit sees the new value.
    let reader2 = session.begin_read();
    assert_eq!(reader2.revision(), Revision(2));
    if let NodeRecord::Text(t) = reader2.get_node(NodeKey(1)).unwrap().unwrap() {
        assert_eq!(t.value.raw_value, b"v2");
    } else {
        panic!("expected text node");
    }
}

#[test]
fn epoch_tracker_reflects_the_oldest_pinned_reader() {
    let dir = tempdir().unwrap();
    let db = Databases::global()
        .create_database(dir.path(), "mvcc-epoch".into(), sirix_core::config::DatabaseType::Json)
        .unwrap();
    let session = db.create_resource("doc", sirix_core::config::HashType::Rolled, Vec::new()).unwrap();

    let old_reader = session.begin_read();
    assert_eq!(old_reader.revision(), Revision::NONE);

    let txn = session.begin_write().unwrap();
    txn.commit(None, None).unwrap();
    let txn = session.begin_write().unwrap();
    txn.commit(None, None).unwrap();

    let new_reader = session.begin_read();
    assert_eq!(new_reader.revision(), Revision(2));
    assert_eq!(old_reader.revision(), Revision::NONE);
}
