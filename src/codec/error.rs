use thiserror::Error;

/// Errors raised while decoding the primitive wire encodings (§4.1).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("varint shift exceeded 63 bits")]
    VarintShiftOverflow,

    #[error("varint run exceeded 10 bytes")]
    VarintTooLong,

    #[error("10th varint byte carries reserved bits")]
    VarintReservedBits,

    #[error("buffer exhausted while decoding")]
    BufferExhausted,

    #[error("unknown record kind byte {0}")]
    UnknownNodeKind(u8),

    #[error("directory offset {0} out of range")]
    DirectoryOffsetOutOfRange(u16),

    #[error("stored content hash did not match recomputed hash")]
    HashMismatch,
}
