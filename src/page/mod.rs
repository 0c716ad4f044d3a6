//! Page hierarchy (§4.4, §4.5): leaf pages, fragment lists, the indirect
//! tree, revision-root pages, and the uber page.

pub mod error;
pub mod fragment;
pub mod indirect;
pub mod leaf;
pub mod record_page;
pub mod revision_root;
pub mod uber;

use serde::{Deserialize, Serialize};

/// A reference to a page's bytes in the append-only log (§4.6): file
/// offset plus encoded length. Opaque outside the IO layer; the page
/// hierarchy only ever stores and compares these, never interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    pub offset: u64,
    pub length: u32,
}

pub use error::PageError;
