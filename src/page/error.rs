use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("slot {0} not found")]
    SlotNotFound(u16),
    #[error("directory offset {0} out of range")]
    DirectoryOffsetOutOfRange(u16),
    #[error("page fan-out {0} exceeds configured fan-out {1}")]
    FanOutExceeded(usize, usize),
    #[error("page checksum mismatch")]
    ChecksumMismatch,
    #[error(transparent)]
    Codec(#[from] crate::codec::CodecError),
}
