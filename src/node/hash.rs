//! Deterministic content hash (§3.2): a function of node-key, parent-key,
//! kind-id, structural pointers, name triple, and normalized value. Uses
//! `sha2` truncated to 64 bits, matching the teacher's preference for the
//! `sha2` crate over a bespoke hasher (`crypto/file_encryption/mod.rs`
//! pulls in `sha2` for its own digest needs).

use crate::node::NodeKind;
use crate::node::delegate::{NameDelegate, NodeDelegate, StructDelegate};
use sha2::{Digest, Sha256};

/// Inputs hashed for a structural, possibly-named node. `normalized_value`
/// is the kind-specific normalized byte payload (empty for pure structural
/// nodes with no leaf value).
pub struct ContentHashInput<'a> {
    pub kind: NodeKind,
    pub node: &'a NodeDelegate,
    pub structure: Option<&'a StructDelegate>,
    pub name: Option<&'a NameDelegate>,
    pub normalized_value: &'a [u8],
}

/// Mutating any field folded in here must invalidate a cached hash and
/// trigger lazy recompute; callers own that invalidation, this function is
/// pure.
#[must_use]
pub fn content_hash(input: &ContentHashInput<'_>) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update([input.kind as u8]);
    hasher.update(input.node.node_key.0.to_le_bytes());
    hasher.update(input.node.parent_key.0.to_le_bytes());
    if let Some(s) = input.structure {
        hasher.update(s.left_sibling_key.0.to_le_bytes());
        hasher.update(s.right_sibling_key.0.to_le_bytes());
        hasher.update(s.first_child_key.0.to_le_bytes());
        hasher.update(s.last_child_key.0.to_le_bytes());
    }
    if let Some(n) = input.name {
        hasher.update(n.prefix_key.to_le_bytes());
        hasher.update(n.local_name_key.to_le_bytes());
        hasher.update(n.uri_key.to_le_bytes());
    }
    hasher.update(input.normalized_value);
    let digest = hasher.finalize();
    u64::from_le_bytes(digest[0..8].try_into().expect("sha256 digest is at least 8 bytes"))
}
