//! Core identifiers and fixed constants (§3.1).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 64-bit node key, unique within a resource, monotonically assigned.
///
/// [`NodeKey::NULL`] marks "no such node" wherever a structural pointer is
/// absent. [`NodeKey::INVALID_FOR_TYPE_CHECK`] is a second, distinct
/// reserved value kept apart from `NULL` so the two can never be confused
/// as ordinary key arithmetic; no codec path consumes it yet (see
/// DESIGN.md). Neither is ever a key a record actually owns.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey(pub i64);

impl NodeKey {
    pub const NULL: Self = Self(i64::MIN);
    pub const INVALID_FOR_TYPE_CHECK: Self = Self(i64::MIN + 1);

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }

    #[must_use]
    pub const fn new(v: i64) -> Self {
        Self(v)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 32-bit signed revision number. `-1` denotes "no previous revision".
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision(pub i32);

impl Revision {
    pub const NONE: Self = Self(-1);
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatabaseId(pub u64);

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u64);

/// Opaque identifier for a page within a resource's indirect tree.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageKey(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(NodeKey::NULL, NodeKey::INVALID_FOR_TYPE_CHECK);
        assert!(NodeKey::NULL.is_null());
        assert!(!NodeKey::INVALID_FOR_TYPE_CHECK.is_null());
    }

    #[test]
    fn revision_none_is_minus_one() {
        assert_eq!(Revision::NONE.0, -1);
        assert!(Revision::NONE.is_none());
        assert_eq!(Revision::FIRST.next().0, 2);
    }
}
