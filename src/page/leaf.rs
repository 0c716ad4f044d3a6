//! Key-value leaf page (§4.4): a record directory over a flat slot arena.
//!
//! Layout: `[uber-slot(8B)] [directory: N x 2B offsets] [slot arena]
//! [per-revision slot bitmap]`. The uber-slot and dewey-id map are owned by
//! the caller (the uber page proper, and [`crate::node::dewey`]
//! respectively); this type owns only the directory/arena/bitmap.
//! Grounded on the teacher's `Page`/`PageHeader` CRC-checked envelope
//! (`recovery/wasp/page.rs`), generalized with the directory layer the
//! teacher's flat page blob does not have.

use super::error::PageError;
use crate::codec::CodecError;
use serde::{Deserialize, Serialize};

/// Marks a directory slot as unused, per §4.4.
const UNUSED_OFFSET: u16 = 0xFFFF;

/// A single leaf page's record directory, slot arena, and per-revision
/// write bitmap. Persisted as a single serialized blob (its own
/// in-memory slot-reuse logic stays entirely off-disk); see
/// [`crate::page::record_page`] for how callers address it by node key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeafPage {
    directory: Vec<u16>,
    arena: Vec<u8>,
    /// Bit `i` set means slot `i` was (re)written in the revision that
    /// produced this page fragment.
    written_in_revision: Vec<bool>,
}

impl LeafPage {
    #[must_use]
    pub fn with_capacity(slots: usize) -> Self {
        Self {
            directory: vec![UNUSED_OFFSET; slots],
            arena: Vec::new(),
            written_in_revision: vec![false; slots],
        }
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.directory.len()
    }

    fn ensure_slot(&mut self, slot: usize) {
        if slot >= self.directory.len() {
            self.directory.resize(slot + 1, UNUSED_OFFSET);
            self.written_in_revision.resize(slot + 1, false);
        }
    }

    /// Looks up the raw record bytes for `slot`. Each record is stored as a
    /// 4-byte little-endian length prefix followed by its payload, so the
    /// arena can host variable-width records without an external length
    /// table.
    ///
    /// # Errors
    /// Returns [`PageError::SlotNotFound`] for an unused or out-of-range
    /// slot, or [`PageError::Codec`] if the stored length prefix runs past
    /// the end of the arena (corrupt page).
    pub fn get(&self, slot: usize) -> Result<&[u8], PageError> {
        let offset = *self.directory.get(slot).ok_or(PageError::SlotNotFound(slot as u16))?;
        if offset == UNUSED_OFFSET {
            return Err(PageError::SlotNotFound(slot as u16));
        }
        let offset = offset as usize;
        let len_bytes: [u8; 4] = self
            .arena
            .get(offset..offset + 4)
            .ok_or(CodecError::BufferExhausted)?
            .try_into()
            .expect("slice is exactly 4 bytes");
        let len = u32::from_le_bytes(len_bytes) as usize;
        self.arena.get(offset + 4..offset + 4 + len).ok_or(CodecError::BufferExhausted.into())
    }

    /// Writes `record` to `slot`. If an existing record occupies the slot
    /// and the new encoding is no wider than the old one, it is patched in
    /// place (directory untouched beyond the offset, which does not move);
    /// otherwise the record is appended to the arena and the old bytes are
    /// abandoned for later compaction, per §4.4.
    pub fn put(&mut self, slot: usize, record: &[u8]) {
        self.ensure_slot(slot);
        let needed = 4 + record.len();
        if let Some(existing_offset) = self.existing_offset_if_fits(slot, needed) {
            self.patch_in_place(existing_offset, record);
        } else {
            let new_offset = self.append(record);
            self.directory[slot] = new_offset;
        }
        self.written_in_revision[slot] = true;
    }

    fn existing_offset_if_fits(&self, slot: usize, needed: usize) -> Option<u16> {
        let offset = self.directory[slot];
        if offset == UNUSED_OFFSET {
            return None;
        }
        let old_len_bytes: [u8; 4] =
            self.arena.get(offset as usize..offset as usize + 4)?.try_into().ok()?;
        let old_total = 4 + u32::from_le_bytes(old_len_bytes) as usize;
        (needed <= old_total).then_some(offset)
    }

    fn patch_in_place(&mut self, offset: u16, record: &[u8]) {
        let at = offset as usize;
        self.arena[at..at + 4].copy_from_slice(&(record.len() as u32).to_le_bytes());
        self.arena[at + 4..at + 4 + record.len()].copy_from_slice(record);
    }

    fn append(&mut self, record: &[u8]) -> u16 {
        let offset = u16::try_from(self.arena.len()).expect("arena grows past u16 range");
        self.arena.extend_from_slice(&(record.len() as u32).to_le_bytes());
        self.arena.extend_from_slice(record);
        offset
    }

    /// Slots written in the revision that produced this fragment.
    #[must_use]
    pub fn written_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.written_in_revision.iter().enumerate().filter_map(|(i, &w)| w.then_some(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let mut page = LeafPage::with_capacity(4);
        page.put(0, b"hello");
        assert_eq!(page.get(0).unwrap(), b"hello");
    }

    #[test]
    fn unused_slot_is_not_found() {
        let page = LeafPage::with_capacity(4);
        assert_eq!(page.get(1), Err(PageError::SlotNotFound(1)));
    }

    #[test]
    fn narrower_rewrite_patches_in_place() {
        let mut page = LeafPage::with_capacity(2);
        page.put(0, b"0123456789");
        let offset_before = page.directory[0];
        page.put(0, b"short");
        assert_eq!(page.directory[0], offset_before, "in-place patch must not move the offset");
        assert_eq!(page.get(0).unwrap(), b"short");
    }

    #[test]
    fn wider_rewrite_appends_and_updates_directory() {
        let mut page = LeafPage::with_capacity(2);
        page.put(0, b"x");
        let offset_before = page.directory[0];
        page.put(0, b"a much longer replacement value");
        assert_ne!(page.directory[0], offset_before);
        assert_eq!(page.get(0).unwrap(), b"a much longer replacement value");
    }

    #[test]
    fn written_slots_tracks_puts() {
        let mut page = LeafPage::with_capacity(4);
        page.put(2, b"x");
        let written: Vec<usize> = page.written_slots().collect();
        assert_eq!(written, vec![2]);
    }
}
