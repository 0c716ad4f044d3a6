//! Shared field groups embedded by concrete node records (§3.2, §4.3.1).
//!
//! SirixDB-style node kinds compose rather than inherit: a structural node
//! embeds a [`NodeDelegate`] plus a [`StructDelegate`]; a named, valued leaf
//! embeds a [`NodeDelegate`] plus a [`ValueDelegate`] and (if named) a
//! [`NameDelegate`]. This mirrors the teacher's plain-struct-plus-enum
//! composition (`document/types.rs::Metadata` wrapping a `DocumentType`)
//! generalized to the node hierarchy the original spec requires.

use crate::node::dewey::DeweyId;
use crate::types::{NodeKey, Revision};
use serde::{Deserialize, Serialize};

/// Fields every node record carries regardless of kind. Not `Copy`: the
/// optional DeweyID owns a byte vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDelegate {
    pub node_key: NodeKey,
    pub parent_key: NodeKey,
    pub previous_revision: Revision,
    pub last_modified_revision: Revision,
    pub dewey_id: Option<DeweyId>,
}

impl NodeDelegate {
    #[must_use]
    pub const fn new(node_key: NodeKey, parent_key: NodeKey, current_revision: Revision) -> Self {
        Self {
            node_key,
            parent_key,
            previous_revision: Revision::NONE,
            last_modified_revision: current_revision,
            dewey_id: None,
        }
    }

    /// Per §3.2: `previous_revision` must be `< current_revision` unless the
    /// record was introduced at `current_revision`, in which case it is
    /// [`Revision::NONE`].
    #[must_use]
    pub const fn has_valid_previous_revision(&self, current_revision: Revision) -> bool {
        self.previous_revision.is_none() || self.previous_revision.0 < current_revision.0
    }
}

/// Doubly linked sibling pointers plus child-tracking fields for structural
/// nodes (element, array, object, object-key, document roots, path-summary
/// entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDelegate {
    pub left_sibling_key: NodeKey,
    pub right_sibling_key: NodeKey,
    pub first_child_key: NodeKey,
    pub last_child_key: NodeKey,
    pub child_count: Option<u64>,
    pub descendant_count: Option<u64>,
    pub content_hash: Option<u64>,
}

impl StructDelegate {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            left_sibling_key: NodeKey::NULL,
            right_sibling_key: NodeKey::NULL,
            first_child_key: NodeKey::NULL,
            last_child_key: NodeKey::NULL,
            child_count: None,
            descendant_count: None,
            content_hash: None,
        }
    }

    /// Per §3.2: `first_child_key == NULL ⇔ last_child_key == NULL ⇔
    /// child_count == 0`, and `descendant_count >= child_count` when both
    /// are tracked.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let no_children = self.first_child_key.is_null() && self.last_child_key.is_null();
        let count_matches_null = match self.child_count {
            Some(0) => no_children,
            Some(_) => !no_children,
            None => true,
        };
        let descendant_ge_child = match (self.descendant_count, self.child_count) {
            (Some(d), Some(c)) => d >= c,
            _ => true,
        };
        count_matches_null && descendant_ge_child
    }
}

/// Name-table indices for a named node (element, attribute, namespace, PI,
/// path, object-key), plus the owning path-node key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameDelegate {
    pub prefix_key: i32,
    pub local_name_key: i32,
    pub uri_key: i32,
    pub path_node_key: NodeKey,
}

impl NameDelegate {
    pub const NO_KEY: i32 = -1;

    #[must_use]
    pub const fn unnamed(path_node_key: NodeKey) -> Self {
        Self { prefix_key: Self::NO_KEY, local_name_key: Self::NO_KEY, uri_key: Self::NO_KEY, path_node_key }
    }
}

/// Raw or typed payload shared by leaf value nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDelegate {
    pub compressed: bool,
    pub raw_value: Vec<u8>,
}

impl ValueDelegate {
    #[must_use]
    pub const fn new(raw_value: Vec<u8>, compressed: bool) -> Self {
        Self { raw_value, compressed }
    }
}
