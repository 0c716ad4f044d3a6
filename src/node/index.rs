//! Red-black index node records (§3.2): CAS, path, name, and value indexes.
//! Each stores a typed key, left/right child keys, a value-node
//! back-reference, a changed flag, and embeds a [`NodeDelegate`] for
//! revision tracking.

use crate::node::NodeKind;
use crate::node::delegate::NodeDelegate;
use crate::node::traits::Node;
use crate::types::{NodeKey, Revision};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// The typed key an index node sorts on, matching the value kinds a
/// CAS/value index can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexKey {
    Str(String),
    Number(OrderedFloat<f64>),
    Boolean(bool),
    PathNode(NodeKey),
    Name(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RbColor {
    Red,
    Black,
}

/// One entry in a red-black tree index, generic over which index kind it
/// belongs to ([`NodeKind::CasIndex`], [`NodeKind::PathIndex`],
/// [`NodeKind::NameIndex`], [`NodeKind::ValueIndex`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RbIndexNode {
    pub node: NodeDelegate,
    pub kind: NodeKind,
    pub key: IndexKey,
    pub left_child_key: NodeKey,
    pub right_child_key: NodeKey,
    pub parent_index_key: NodeKey,
    pub value_node_key: NodeKey,
    pub color: RbColor,
    pub changed: bool,
}

impl RbIndexNode {
    #[must_use]
    pub const fn new(node: NodeDelegate, kind: NodeKind, key: IndexKey, value_node_key: NodeKey) -> Self {
        Self {
            node,
            kind,
            key,
            left_child_key: NodeKey::NULL,
            right_child_key: NodeKey::NULL,
            parent_index_key: NodeKey::NULL,
            value_node_key,
            color: RbColor::Red,
            changed: true,
        }
    }
}

impl Node for RbIndexNode {
    fn node_key(&self) -> NodeKey {
        self.node.node_key
    }
    fn parent_key(&self) -> NodeKey {
        self.node.parent_key
    }
    fn kind(&self) -> NodeKind {
        self.kind
    }
    fn previous_revision(&self) -> Revision {
        self.node.previous_revision
    }
    fn last_modified_revision(&self) -> Revision {
        self.node.last_modified_revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_index_node_starts_red_and_changed() {
        let node = NodeDelegate::new(NodeKey(10), NodeKey::NULL, Revision::FIRST);
        let entry = RbIndexNode::new(node, NodeKind::CasIndex, IndexKey::Str("x".into()), NodeKey(3));
        assert_eq!(entry.color, RbColor::Red);
        assert!(entry.changed);
        assert!(entry.left_child_key.is_null());
    }
}
