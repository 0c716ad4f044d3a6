//! Name-table and path-summary entry records (§3.2, §4.3.1): interned
//! prefix/local-name/URI strings, referenced from named nodes by integer
//! key rather than repeating the string on every record.

use crate::types::NodeKey;
use serde::{Deserialize, Serialize};

/// One interned name-table entry: a string plus the count of live
/// references, so the table can reclaim an entry once its last referencing
/// node is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTableEntry {
    pub key: i32,
    pub value: String,
    pub reference_count: u32,
}

impl NameTableEntry {
    #[must_use]
    pub const fn new(key: i32, value: String) -> Self {
        Self { key, value, reference_count: 1 }
    }
}

/// A path-summary entry: one node per distinct structural path in the
/// resource, itself a structural+named node (hence it composes the same
/// delegates as [`crate::node::structural::ElementNode`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSummaryEntry {
    pub node: crate::node::delegate::NodeDelegate,
    pub structure: crate::node::delegate::StructDelegate,
    pub name: crate::node::delegate::NameDelegate,
    pub level: u32,
    pub reference_count: u32,
}

impl crate::node::traits::Node for PathSummaryEntry {
    fn node_key(&self) -> NodeKey {
        self.node.node_key
    }
    fn parent_key(&self) -> NodeKey {
        self.node.parent_key
    }
    fn kind(&self) -> crate::node::NodeKind {
        crate::node::NodeKind::PathSummary
    }
    fn previous_revision(&self) -> crate::types::Revision {
        self.node.previous_revision
    }
    fn last_modified_revision(&self) -> crate::types::Revision {
        self.node.last_modified_revision
    }
}
