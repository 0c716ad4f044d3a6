//! Behavioral node categories (§3.2, §9 REDESIGN FLAGS): traits in place of
//! the inheritance hierarchy an OO implementation would use. A concrete node
//! type implements whichever subset applies to it — a text node implements
//! [`Node`] and [`ValueNode`] but not [`StructNode`]; an element implements
//! all three plus [`NameNode`].

use crate::node::NodeKind;
use crate::types::{NodeKey, Revision};

/// Fields and behavior every node kind has.
pub trait Node {
    fn node_key(&self) -> NodeKey;
    fn parent_key(&self) -> NodeKey;
    fn kind(&self) -> NodeKind;
    fn previous_revision(&self) -> Revision;
    fn last_modified_revision(&self) -> Revision;

    fn has_parent(&self) -> bool {
        !self.parent_key().is_null()
    }
}

/// Structural nodes: element, array, object, object-key, document roots,
/// path-summary entries.
pub trait StructNode: Node {
    fn left_sibling_key(&self) -> NodeKey;
    fn right_sibling_key(&self) -> NodeKey;
    fn first_child_key(&self) -> NodeKey;
    fn last_child_key(&self) -> NodeKey;
    fn child_count(&self) -> Option<u64>;
    fn descendant_count(&self) -> Option<u64>;

    fn has_children(&self) -> bool {
        !self.first_child_key().is_null()
    }
}

/// Named nodes: element, attribute, namespace, PI, path, object-key.
pub trait NameNode: Node {
    fn prefix_key(&self) -> i32;
    fn local_name_key(&self) -> i32;
    fn uri_key(&self) -> i32;
    fn path_node_key(&self) -> NodeKey;
}

/// Leaf value nodes carrying a raw or typed payload.
pub trait ValueNode: Node {
    fn raw_value(&self) -> &[u8];
    fn is_compressed(&self) -> bool;
}

/// A record that may be bound to backing page bytes instead of fully
/// materialized (§3.3, §4.3.2).
pub trait FlyweightBind {
    /// True once bound to a page segment; bound getters read directly from
    /// the segment instead of materialized fields.
    fn is_bound(&self) -> bool;

    /// True when bound to the given page, identified by its page key.
    fn is_bound_to(&self, page_key: crate::types::PageKey) -> bool;

    /// Invalidates the binding (the underlying page was evicted or
    /// rewritten); subsequent access must rebind or fall back to
    /// materialized reads.
    fn unbind(&mut self);
}
