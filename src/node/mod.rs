//! Node records (§3.2, §4.3): the envelope, byte-stable kind ids, and the
//! four behavioral trait categories every concrete node kind implements a
//! subset of.

pub mod codec;
pub mod delegate;
pub mod dewey;
pub mod hash;
pub mod index;
pub mod name;
pub mod structural;
pub mod traits;
pub mod value;

use crate::codec::CodecError;
use serde::{Deserialize, Serialize};

/// Stable on-disk kind ids, matching the teacher's plain-enum-with-derive
/// convention (`document/types.rs::DocumentType`, `database/index.rs::IndexKind`).
/// Never reorder or reuse a discriminant: it is the first byte of every
/// record's envelope and old pages must keep decoding correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeKind {
    DocumentRoot = 0,
    Element = 1,
    Attribute = 2,
    Namespace = 3,
    Text = 4,
    Comment = 5,
    ProcessingInstruction = 6,
    JsonDocumentRoot = 7,
    Object = 8,
    ObjectKey = 9,
    Array = 10,
    JsonString = 11,
    JsonNumber = 12,
    JsonBoolean = 13,
    JsonNull = 14,
    PathSummary = 15,
    CasIndex = 16,
    PathIndex = 17,
    NameIndex = 18,
    ValueIndex = 19,
}

impl NodeKind {
    const ALL: [Self; 20] = [
        Self::DocumentRoot,
        Self::Element,
        Self::Attribute,
        Self::Namespace,
        Self::Text,
        Self::Comment,
        Self::ProcessingInstruction,
        Self::JsonDocumentRoot,
        Self::Object,
        Self::ObjectKey,
        Self::Array,
        Self::JsonString,
        Self::JsonNumber,
        Self::JsonBoolean,
        Self::JsonNull,
        Self::PathSummary,
        Self::CasIndex,
        Self::PathIndex,
        Self::NameIndex,
        Self::ValueIndex,
    ];

    /// Decodes a kind-id byte read from a record envelope.
    ///
    /// # Errors
    /// Returns [`CodecError::UnknownNodeKind`] if `byte` is not a recognized
    /// discriminant.
    pub fn from_byte(byte: u8) -> Result<Self, CodecError> {
        Self::ALL.into_iter().find(|k| *k as u8 == byte).ok_or(CodecError::UnknownNodeKind(byte))
    }

    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// True for kinds that carry structural pointers (§3.2 "structural
    /// nodes" plus the path-summary entry).
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(
            self,
            Self::DocumentRoot
                | Self::Element
                | Self::JsonDocumentRoot
                | Self::Object
                | Self::ObjectKey
                | Self::Array
                | Self::PathSummary
        )
    }

    /// True for kinds that carry a name triple.
    #[must_use]
    pub const fn is_named(self) -> bool {
        matches!(
            self,
            Self::Element
                | Self::Attribute
                | Self::Namespace
                | Self::ProcessingInstruction
                | Self::ObjectKey
                | Self::PathSummary
        )
    }

    /// True for the four red-black index kinds.
    #[must_use]
    pub const fn is_index(self) -> bool {
        matches!(self, Self::CasIndex | Self::PathIndex | Self::NameIndex | Self::ValueIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_byte_round_trips_for_every_variant() {
        for kind in NodeKind::ALL {
            let byte = kind.to_byte();
            assert_eq!(NodeKind::from_byte(byte).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_byte_is_rejected() {
        assert_eq!(NodeKind::from_byte(255), Err(CodecError::UnknownNodeKind(255)));
    }

    #[test]
    fn discriminants_are_stable() {
        assert_eq!(NodeKind::DocumentRoot.to_byte(), 0);
        assert_eq!(NodeKind::Element.to_byte(), 1);
        assert_eq!(NodeKind::ValueIndex.to_byte(), 19);
    }
}
