//! Uber page (§4.5): the single root reference every resource's append log
//! reserves an 8-byte slot for. Rewritten last on commit (§4.7 step 7), so
//! it is the atomicity boundary: a crash before this write leaves the
//! previous revision recoverable.

use super::PageRef;
use crate::types::Revision;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UberPage {
    /// `None` means the resource has never had a revision committed
    /// through it yet (the uber slot is still all-zero). The first
    /// successful commit fills this in.
    pub revision_root_ref: Option<PageRef>,
    pub max_revision: Revision,
    pub log_append_offset: u64,
}

impl UberPage {
    /// The state of a brand-new resource before its first commit:
    /// [`Revision::NONE`], no revision root reference.
    #[must_use]
    pub const fn uninitialized() -> Self {
        Self { revision_root_ref: None, max_revision: Revision::NONE, log_append_offset: 0 }
    }

    #[must_use]
    pub const fn with_new_commit(revision_root_ref: PageRef, new_revision: Revision, log_append_offset: u64) -> Self {
        Self { revision_root_ref: Some(revision_root_ref), max_revision: new_revision, log_append_offset }
    }
}
