//! Record-page addressing and the per-revision page directory (§4.4,
//! §4.5): a record's slot within a leaf page is the low-order bits of its
//! node key, so the key itself never needs to be stored in the record
//! payload — [`locate`] recovers `(page_number, slot)` and the inverse is
//! always `page_number * RECORD_PAGE_FAN_OUT + slot`.
//!
//! [`RecordPageDirectory`] is the committed mapping from page number to
//! that leaf page's on-disk reference. It is a simplified, single-level
//! stand-in for the general fan-out-`F` multi-level indirect tree in
//! §4.5: at the node-key volumes this engine is exercised at (see
//! DESIGN.md), one level is sufficient, and copy-on-write at the leaf
//! level is preserved (an unchanged leaf page's reference in the
//! directory carries forward unchanged across a commit that does not
//! touch it).

use super::PageRef;
use crate::node::codec::{self, NodeRecord};
use crate::page::PageError;
use crate::page::leaf::LeafPage;
use crate::types::NodeKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default leaf fan-out (§8 scenario S2: "for the leaf fan-out configured
/// (F=1024 default)").
pub const RECORD_PAGE_FAN_OUT: u64 = 1024;

/// Splits `node_key` into the leaf page that owns it and the slot within
/// that page, using `RECORD_PAGE_FAN_OUT`'s low-order bits (§4.4: "a
/// contiguous, sparse range of records addressed by the low-order bits of
/// their node-keys").
#[must_use]
pub fn locate(node_key: NodeKey) -> (u64, usize) {
    debug_assert!(node_key.0 >= 0, "only non-sentinel, non-negative node keys are stored");
    let k = node_key.0 as u64;
    (k / RECORD_PAGE_FAN_OUT, (k % RECORD_PAGE_FAN_OUT) as usize)
}

/// Writes `record` into `slot` of `page` using the §4.3.1 wire encoding.
pub fn put_node(page: &mut LeafPage, slot: usize, record: &NodeRecord) {
    let bytes = codec::encode(record);
    page.put(slot, &bytes);
}

/// Reads and decodes the record at `slot`, reconstructing its absolute
/// node key from `page_number`/`slot` per [`locate`]'s inverse.
///
/// # Errors
/// Returns `Ok(None)` for an unused slot; propagates [`PageError`] for a
/// corrupt record.
pub fn get_node(page: &LeafPage, page_number: u64, slot: usize) -> Result<Option<NodeRecord>, PageError> {
    match page.get(slot) {
        Ok(bytes) => {
            let own = NodeKey((page_number * RECORD_PAGE_FAN_OUT + slot as u64) as i64);
            Ok(Some(codec::decode(own, bytes)?))
        }
        Err(PageError::SlotNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// The committed page-number → leaf-page-reference mapping for one
/// resource revision (§4.5's indirect tree, simplified to one level; see
/// module docs).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPageDirectory(HashMap<u64, PageRef>);

impl RecordPageDirectory {
    #[must_use]
    pub fn get(&self, page_number: u64) -> Option<PageRef> {
        self.0.get(&page_number).copied()
    }

    pub fn set(&mut self, page_number: u64, page_ref: PageRef) {
        self.0.insert(page_number, page_ref);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_splits_by_fan_out() {
        assert_eq!(locate(NodeKey(0)), (0, 0));
        assert_eq!(locate(NodeKey(1023)), (0, 1023));
        assert_eq!(locate(NodeKey(1024)), (1, 0));
        assert_eq!(locate(NodeKey(2050)), (2, 2));
    }

    #[test]
    fn directory_round_trips_through_bincode() {
        let mut dir = RecordPageDirectory::default();
        dir.set(0, PageRef { offset: 64, length: 128 });
        let bytes = bincode::serde::encode_to_vec(&dir, bincode::config::standard()).unwrap();
        let (decoded, _): (RecordPageDirectory, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        assert_eq!(decoded.get(0), Some(PageRef { offset: 64, length: 128 }));
        assert_eq!(decoded.get(1), None);
    }

    #[test]
    fn put_then_get_node_recovers_absolute_key() {
        use crate::node::delegate::NodeDelegate;
        use crate::node::structural::ArrayNode;
        use crate::node::delegate::StructDelegate;
        use crate::types::Revision;

        let mut page = LeafPage::with_capacity(4);
        let (page_number, slot) = locate(NodeKey(2050));
        let record = NodeRecord::Array(ArrayNode {
            node: NodeDelegate::new(NodeKey(2050), NodeKey(1), Revision::FIRST),
            structure: StructDelegate::empty(),
        });
        put_node(&mut page, slot, &record);
        let decoded = get_node(&page, page_number, slot).unwrap().unwrap();
        assert_eq!(decoded.node_key(), NodeKey(2050));
        assert_eq!(decoded, record);
    }
}
