//! Revision root page (§4.5): per-revision commit metadata plus the
//! indirect-tree references reachable from this revision.

use super::PageRef;
use crate::types::Revision;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRootPage {
    pub revision: Revision,
    pub commit_timestamp_millis: i64,
    pub commit_message: Option<String>,
    pub record_pages_ref: Option<PageRef>,
    pub cas_index_ref: Option<PageRef>,
    pub path_index_ref: Option<PageRef>,
    pub name_index_ref: Option<PageRef>,
    pub value_index_ref: Option<PageRef>,
    pub path_summary_ref: Option<PageRef>,
}

impl RevisionRootPage {
    #[must_use]
    pub const fn empty(revision: Revision, commit_timestamp_millis: i64) -> Self {
        Self {
            revision,
            commit_timestamp_millis,
            commit_message: None,
            record_pages_ref: None,
            cas_index_ref: None,
            path_index_ref: None,
            name_index_ref: None,
            value_index_ref: None,
            path_summary_ref: None,
        }
    }
}
