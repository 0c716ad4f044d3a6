//! Indirect page tree (§4.5): a fan-out-`F` tree of page references whose
//! leaf level references record pages (as [`FragmentList`]s). Grounded on
//! the teacher's copy-on-write `CowTree` (`recovery/wasp/tree.rs`) for the
//! "allocate new page id, write new page, rewrite parent chain" commit
//! shape, generalized from a two-level B-tree into an arbitrary-depth,
//! fixed-fan-out tree addressed by page number rather than by key range.

use super::PageRef;
use super::error::PageError;

/// One level of the indirect tree: up to `fan_out` child references.
/// Unset entries are `None`.
#[derive(Debug, Clone)]
pub struct IndirectPage {
    fan_out: usize,
    children: Vec<Option<PageRef>>,
}

impl IndirectPage {
    #[must_use]
    pub fn new(fan_out: usize) -> Self {
        Self { fan_out, children: vec![None; fan_out] }
    }

    /// # Errors
    /// Returns [`PageError::FanOutExceeded`] if `index >= fan_out`.
    pub fn set(&mut self, index: usize, page_ref: PageRef) -> Result<(), PageError> {
        if index >= self.fan_out {
            return Err(PageError::FanOutExceeded(index, self.fan_out));
        }
        self.children[index] = Some(page_ref);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<PageRef> {
        self.children.get(index).copied().flatten()
    }

    /// Copy-on-write clone of this level, to be mutated and rewritten as a
    /// new page while this instance remains reachable from the old
    /// revision root.
    #[must_use]
    pub fn cow_clone(&self) -> Self {
        self.clone()
    }
}

/// Decomposes a zero-based record-page number into per-level child indices
/// (most significant level first), given the tree's `fan_out` and `depth`.
/// Page number `0` at `depth = 1, fan_out = F` is `[0]`; at `depth = 2` a
/// page number `p` is `[p / F, p % F]`.
#[must_use]
pub fn page_path(page_number: u64, fan_out: usize, depth: usize) -> Vec<usize> {
    let mut indices = vec![0usize; depth];
    let mut remaining = page_number;
    let fan_out = fan_out as u64;
    for slot in indices.iter_mut().rev() {
        *slot = (remaining % fan_out) as usize;
        remaining /= fan_out;
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_round_trip() {
        let mut page = IndirectPage::new(8);
        let r = PageRef { offset: 42, length: 7 };
        page.set(3, r).unwrap();
        assert_eq!(page.get(3), Some(r));
        assert_eq!(page.get(0), None);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut page = IndirectPage::new(4);
        assert_eq!(
            page.set(4, PageRef { offset: 0, length: 0 }),
            Err(PageError::FanOutExceeded(4, 4))
        );
    }

    #[test]
    fn page_path_decomposes_by_fan_out() {
        assert_eq!(page_path(0, 4, 2), vec![0, 0]);
        assert_eq!(page_path(5, 4, 2), vec![1, 1]);
        assert_eq!(page_path(17, 4, 3), vec![1, 0, 1]);
    }
}
