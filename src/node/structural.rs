//! Structural nodes (§3.2, §4.3.1): element, array, object, object-key, and
//! document roots. Each embeds a [`NodeDelegate`] and [`StructDelegate`];
//! named variants additionally embed a [`NameDelegate`].

use crate::node::NodeKind;
use crate::node::delegate::{NameDelegate, NodeDelegate, StructDelegate};
use crate::node::traits::{NameNode, Node, StructNode};
use crate::types::{NodeKey, Revision};
use serde::{Deserialize, Serialize};

macro_rules! struct_node_impl {
    ($name:ident, $kind:expr) => {
        impl Node for $name {
            fn node_key(&self) -> NodeKey {
                self.node.node_key
            }
            fn parent_key(&self) -> NodeKey {
                self.node.parent_key
            }
            fn kind(&self) -> NodeKind {
                $kind
            }
            fn previous_revision(&self) -> Revision {
                self.node.previous_revision
            }
            fn last_modified_revision(&self) -> Revision {
                self.node.last_modified_revision
            }
        }

        impl StructNode for $name {
            fn left_sibling_key(&self) -> NodeKey {
                self.structure.left_sibling_key
            }
            fn right_sibling_key(&self) -> NodeKey {
                self.structure.right_sibling_key
            }
            fn first_child_key(&self) -> NodeKey {
                self.structure.first_child_key
            }
            fn last_child_key(&self) -> NodeKey {
                self.structure.last_child_key
            }
            fn child_count(&self) -> Option<u64> {
                self.structure.child_count
            }
            fn descendant_count(&self) -> Option<u64> {
                self.structure.descendant_count
            }
        }
    };
}

/// An XML/XDM element: structural, named, and (per §4.3.1) serialized with
/// attribute/namespace counts and key lists following the name triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    pub node: NodeDelegate,
    pub structure: StructDelegate,
    pub name: NameDelegate,
    pub attribute_keys: Vec<NodeKey>,
    pub namespace_keys: Vec<NodeKey>,
}

struct_node_impl!(ElementNode, NodeKind::Element);

impl NameNode for ElementNode {
    fn prefix_key(&self) -> i32 {
        self.name.prefix_key
    }
    fn local_name_key(&self) -> i32 {
        self.name.local_name_key
    }
    fn uri_key(&self) -> i32 {
        self.name.uri_key
    }
    fn path_node_key(&self) -> NodeKey {
        self.name.path_node_key
    }
}

/// An XML namespace declaration: named, non-valued, leaf-like but modeled
/// structurally since it may be referenced like any other child pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceNode {
    pub node: NodeDelegate,
    pub name: NameDelegate,
}

impl Node for NamespaceNode {
    fn node_key(&self) -> NodeKey {
        self.node.node_key
    }
    fn parent_key(&self) -> NodeKey {
        self.node.parent_key
    }
    fn kind(&self) -> NodeKind {
        NodeKind::Namespace
    }
    fn previous_revision(&self) -> Revision {
        self.node.previous_revision
    }
    fn last_modified_revision(&self) -> Revision {
        self.node.last_modified_revision
    }
}

impl NameNode for NamespaceNode {
    fn prefix_key(&self) -> i32 {
        self.name.prefix_key
    }
    fn local_name_key(&self) -> i32 {
        self.name.local_name_key
    }
    fn uri_key(&self) -> i32 {
        self.name.uri_key
    }
    fn path_node_key(&self) -> NodeKey {
        self.name.path_node_key
    }
}

/// A JSON object: structural only, unnamed (its entries are
/// [`ObjectKeyNode`]s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectNode {
    pub node: NodeDelegate,
    pub structure: StructDelegate,
}

struct_node_impl!(ObjectNode, NodeKind::Object);

/// A JSON object's key/value pair: named (the key string is interned) and
/// structural (its single child is the value subtree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectKeyNode {
    pub node: NodeDelegate,
    pub structure: StructDelegate,
    pub name: NameDelegate,
}

struct_node_impl!(ObjectKeyNode, NodeKind::ObjectKey);

impl NameNode for ObjectKeyNode {
    fn prefix_key(&self) -> i32 {
        self.name.prefix_key
    }
    fn local_name_key(&self) -> i32 {
        self.name.local_name_key
    }
    fn uri_key(&self) -> i32 {
        self.name.uri_key
    }
    fn path_node_key(&self) -> NodeKey {
        self.name.path_node_key
    }
}

/// A JSON array: structural only, unnamed, ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayNode {
    pub node: NodeDelegate,
    pub structure: StructDelegate,
}

struct_node_impl!(ArrayNode, NodeKind::Array);

/// The XML document root: exactly one structural child, no parent, no name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRootNode {
    pub node: NodeDelegate,
    pub structure: StructDelegate,
}

struct_node_impl!(DocumentRootNode, NodeKind::DocumentRoot);

/// The JSON document root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonDocumentRootNode {
    pub node: NodeDelegate,
    pub structure: StructDelegate,
}

struct_node_impl!(JsonDocumentRootNode, NodeKind::JsonDocumentRoot);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKey;

    #[test]
    fn empty_structure_has_no_children_and_is_consistent() {
        let structure = StructDelegate::empty();
        assert!(structure.is_consistent());
        let obj = ObjectNode { node: NodeDelegate::new(NodeKey(1), NodeKey::NULL, Revision::FIRST), structure };
        assert!(!obj.has_children());
        assert_eq!(obj.first_child_key(), NodeKey::NULL);
    }

    #[test]
    fn inconsistent_structure_is_detected() {
        let mut structure = StructDelegate::empty();
        structure.first_child_key = NodeKey(5);
        // last_child_key still NULL while first_child_key is set: inconsistent.
        assert!(!structure.is_consistent());
    }
}
