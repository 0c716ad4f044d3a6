//! Append-only IO storage (§4.6): one file per resource. Layout:
//! `[magic+format-version][uber-slot (8B, reserved, updated last)]
//! [page stream: (length-prefix, payload)...]`. Grounded on the teacher's
//! `Wasp` (`recovery/wasp/wasp_engine.rs`: buffered append-only file opened
//! with `OpenOptions::new().create(true).append(true).read(true)`) and
//! `SegmentFile` (`recovery/wasp/segment.rs`: `write_all` + `sync_data`),
//! generalized to the length-prefixed page stream with a reserved uber-slot
//! the spec requires.

use crate::page::PageRef;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

pub const MAGIC: &[u8; 4] = b"SRXC";
pub const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: u64 = 8; // magic (4) + format version (4)
const UBER_SLOT_LEN: u64 = 8;
pub const PAGE_STREAM_START: u64 = HEADER_LEN + UBER_SLOT_LEN;

/// The append-only storage file for one resource.
pub struct IoStorage {
    file: File,
}

impl IoStorage {
    /// Opens (creating if absent) the resource's append log, writing the
    /// header if the file is new.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let is_new = !path.exists();
        let mut file = OpenOptions::new().create(true).read(true).write(true).open(path)?;
        if is_new {
            file.write_all(MAGIC)?;
            file.write_all(&FORMAT_VERSION.to_le_bytes())?;
            file.write_all(&[0u8; UBER_SLOT_LEN as usize])?;
            file.sync_data()?;
        }
        Ok(Self { file })
    }

    /// Validates the magic and format version, per §6.4.
    pub fn verify_header(&mut self) -> std::io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut magic = [0u8; 4];
        self.file.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "bad magic"));
        }
        let mut version = [0u8; 4];
        self.file.read_exact(&mut version)?;
        if u32::from_le_bytes(version) > FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "unsupported format version",
            ));
        }
        Ok(())
    }

    /// Appends `payload` (already pipeline-encoded) to the end of the page
    /// stream and returns its reference. Does not fsync; callers batch
    /// several appends before a single commit-time fsync (§4.7 step 3/6).
    pub fn append_page(&mut self, payload: &[u8]) -> std::io::Result<PageRef> {
        let offset = self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&(payload.len() as u32).to_le_bytes())?;
        self.file.write_all(payload)?;
        Ok(PageRef { offset, length: payload.len() as u32 })
    }

    /// Reads the payload bytes referenced by `page_ref`, still
    /// pipeline-encoded.
    pub fn read_page(&mut self, page_ref: PageRef) -> std::io::Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(page_ref.offset))?;
        let mut len_bytes = [0u8; 4];
        self.file.read_exact(&mut len_bytes)?;
        let len = u32::from_le_bytes(len_bytes);
        let mut buf = vec![0u8; len as usize];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// `fsync`s pending page writes; must precede [`Self::commit_uber_slot`]
    /// (§4.7 step 6-7).
    pub fn fsync(&mut self) -> std::io::Result<()> {
        self.file.sync_data()
    }

    /// Atomically overwrites the uber-slot, publishing the new revision
    /// root. This is the commit point (§4.7 step 7): a crash before this
    /// call leaves the previous revision recoverable. The slot holds only
    /// the 8-byte file offset; the payload length is recovered from the
    /// length-prefix already stored at that offset in the page stream, so
    /// the reserved 8 bytes the layout allots are enough even though a
    /// [`PageRef`] logically carries both fields.
    pub fn commit_uber_slot(&mut self, revision_root_ref: PageRef) -> std::io::Result<()> {
        self.file.seek(SeekFrom::Start(HEADER_LEN))?;
        self.file.write_all(&revision_root_ref.offset.to_le_bytes())?;
        self.file.sync_data()
    }

    /// Reads the current uber-slot and resolves it into a full
    /// [`PageRef`] by reading the length-prefix stored at that offset.
    /// Returns `None` for a fresh file whose slot is still all-zero (offset
    /// `0` can never be a real page reference: the page stream starts at
    /// [`PAGE_STREAM_START`]).
    pub fn read_uber_slot(&mut self) -> std::io::Result<Option<PageRef>> {
        self.file.seek(SeekFrom::Start(HEADER_LEN))?;
        let mut buf = [0u8; UBER_SLOT_LEN as usize];
        self.file.read_exact(&mut buf)?;
        let offset = u64::from_le_bytes(buf);
        if offset == 0 {
            return Ok(None);
        }
        self.file.seek(SeekFrom::Start(offset))?;
        let mut len_bytes = [0u8; 4];
        self.file.read_exact(&mut len_bytes)?;
        Ok(Some(PageRef { offset, length: u32::from_le_bytes(len_bytes) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn fresh_file_has_empty_uber_slot() {
        let tmp = NamedTempFile::new().unwrap();
        std::fs::remove_file(tmp.path()).ok();
        let mut storage = IoStorage::open(tmp.path()).unwrap();
        assert_eq!(storage.read_uber_slot().unwrap(), None);
    }

    #[test]
    fn append_then_read_round_trips() {
        let tmp = NamedTempFile::new().unwrap();
        std::fs::remove_file(tmp.path()).ok();
        let mut storage = IoStorage::open(tmp.path()).unwrap();
        let page_ref = storage.append_page(b"hello page").unwrap();
        storage.fsync().unwrap();
        assert_eq!(storage.read_page(page_ref).unwrap(), b"hello page");
    }

    #[test]
    fn commit_uber_slot_then_reopen_is_visible() {
        let tmp = NamedTempFile::new().unwrap();
        std::fs::remove_file(tmp.path()).ok();
        let path = tmp.path().to_path_buf();
        let page_ref = {
            let mut storage = IoStorage::open(&path).unwrap();
            let page_ref = storage.append_page(b"revision root bytes").unwrap();
            storage.fsync().unwrap();
            storage.commit_uber_slot(page_ref).unwrap();
            page_ref
        };
        let mut reopened = IoStorage::open(&path).unwrap();
        reopened.verify_header().unwrap();
        assert_eq!(reopened.read_uber_slot().unwrap(), Some(page_ref));
    }
}
