//! Leaf value nodes (§3.2, §4.3.1): text, comment, attribute, PI, and the
//! JSON primitive value kinds, each extending a structural or named
//! delegate with a raw byte payload or a discriminated numeric value.

use crate::node::NodeKind;
use crate::node::delegate::{NameDelegate, NodeDelegate, ValueDelegate};
use crate::node::traits::{NameNode, Node, ValueNode};
use crate::types::{NodeKey, Revision};
use serde::{Deserialize, Serialize};

/// 1-byte discriminator selecting among the numeric representations a
/// JSON/object number value may carry, per §4.3.1's "object-number" example.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumericValue {
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    BigInteger(i128),
    /// Big-decimal: unscaled integer value plus a trailing scale (number of
    /// fractional digits), per §4.3.1.
    BigDecimal { unscaled: i128, scale: u32 },
}

impl NumericValue {
    pub(crate) const TAG_DOUBLE: u8 = 0;
    pub(crate) const TAG_FLOAT: u8 = 1;
    pub(crate) const TAG_INT: u8 = 2;
    pub(crate) const TAG_LONG: u8 = 3;
    pub(crate) const TAG_BIG_INTEGER: u8 = 4;
    pub(crate) const TAG_BIG_DECIMAL: u8 = 5;

    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Double(_) => Self::TAG_DOUBLE,
            Self::Float(_) => Self::TAG_FLOAT,
            Self::Int(_) => Self::TAG_INT,
            Self::Long(_) => Self::TAG_LONG,
            Self::BigInteger(_) => Self::TAG_BIG_INTEGER,
            Self::BigDecimal { .. } => Self::TAG_BIG_DECIMAL,
        }
    }
}

macro_rules! leaf_value_node {
    ($name:ident, $kind:expr) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub node: NodeDelegate,
            pub left_sibling_key: NodeKey,
            pub right_sibling_key: NodeKey,
            pub value: ValueDelegate,
        }

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

        impl ValueNode for $name {
            fn raw_value(&self) -> &[u8] {
                &self.value.raw_value
            }
            fn is_compressed(&self) -> bool {
                self.value.compressed
            }
        }
    };
}

leaf_value_node!(TextNode, NodeKind::Text);
leaf_value_node!(CommentNode, NodeKind::Comment);

/// Attributes and processing instructions are named *and* valued, unlike
/// text/comment which are valued only.
macro_rules! named_value_node {
    ($name:ident, $kind:expr) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub node: NodeDelegate,
            pub name: NameDelegate,
            pub value: ValueDelegate,
        }

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

        impl NameNode for $name {
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

        impl ValueNode for $name {
            fn raw_value(&self) -> &[u8] {
                &self.value.raw_value
            }
            fn is_compressed(&self) -> bool {
                self.value.compressed
            }
        }
    };
}

named_value_node!(AttributeNode, NodeKind::Attribute);
named_value_node!(ProcessingInstructionNode, NodeKind::ProcessingInstruction);

/// A JSON string value (object-value sibling of [`crate::node::structural::ObjectKeyNode`]
/// or an array element).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonStringNode {
    pub node: NodeDelegate,
    pub value: ValueDelegate,
}

impl Node for JsonStringNode {
    fn node_key(&self) -> NodeKey {
        self.node.node_key
    }
    fn parent_key(&self) -> NodeKey {
        self.node.parent_key
    }
    fn kind(&self) -> NodeKind {
        NodeKind::JsonString
    }
    fn previous_revision(&self) -> Revision {
        self.node.previous_revision
    }
    fn last_modified_revision(&self) -> Revision {
        self.node.last_modified_revision
    }
}

impl ValueNode for JsonStringNode {
    fn raw_value(&self) -> &[u8] {
        &self.value.raw_value
    }
    fn is_compressed(&self) -> bool {
        self.value.compressed
    }
}

/// A JSON number value: 1-byte type discriminator + encoded numeric
/// (§4.3.1's "object-number" example).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonNumberNode {
    pub node: NodeDelegate,
    pub numeric: NumericValue,
}

impl Node for JsonNumberNode {
    fn node_key(&self) -> NodeKey {
        self.node.node_key
    }
    fn parent_key(&self) -> NodeKey {
        self.node.parent_key
    }
    fn kind(&self) -> NodeKind {
        NodeKind::JsonNumber
    }
    fn previous_revision(&self) -> Revision {
        self.node.previous_revision
    }
    fn last_modified_revision(&self) -> Revision {
        self.node.last_modified_revision
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonBooleanNode {
    pub node: NodeDelegate,
    pub value: bool,
}

impl Node for JsonBooleanNode {
    fn node_key(&self) -> NodeKey {
        self.node.node_key
    }
    fn parent_key(&self) -> NodeKey {
        self.node.parent_key
    }
    fn kind(&self) -> NodeKind {
        NodeKind::JsonBoolean
    }
    fn previous_revision(&self) -> Revision {
        self.node.previous_revision
    }
    fn last_modified_revision(&self) -> Revision {
        self.node.last_modified_revision
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonNullNode {
    pub node: NodeDelegate,
}

impl Node for JsonNullNode {
    fn node_key(&self) -> NodeKey {
        self.node.node_key
    }
    fn parent_key(&self) -> NodeKey {
        self.node.parent_key
    }
    fn kind(&self) -> NodeKind {
        NodeKind::JsonNull
    }
    fn previous_revision(&self) -> Revision {
        self.node.previous_revision
    }
    fn last_modified_revision(&self) -> Revision {
        self.node.last_modified_revision
    }
}
