//! Crate-wide error taxonomy.
//!
//! Mirrors the five error kinds the storage engine surfaces to callers:
//! corrupt on-disk data, I/O failure, caller misuse, lock contention, and
//! operations against a closed handle. Component-local error types convert
//! into `EngineError` via `#[from]` at the module boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("usage error: {0}")]
    Usage(String),

    #[error("lock contention: {0}")]
    Contention(String),

    #[error("operation on closed handle: {0}")]
    ClosedState(String),
}

impl From<crate::codec::CodecError> for EngineError {
    fn from(e: crate::codec::CodecError) -> Self {
        Self::CorruptData(e.to_string())
    }
}

impl From<bincode::error::DecodeError> for EngineError {
    fn from(e: bincode::error::DecodeError) -> Self {
        Self::CorruptData(format!("bincode decode: {e}"))
    }
}

impl From<bincode::error::EncodeError> for EngineError {
    fn from(e: bincode::error::EncodeError) -> Self {
        Self::CorruptData(format!("bincode encode: {e}"))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Usage(format!("config (json): {e}"))
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        Self::Usage(format!("config (toml): {e}"))
    }
}

impl From<crate::page::PageError> for EngineError {
    fn from(e: crate::page::PageError) -> Self {
        Self::CorruptData(e.to_string())
    }
}

impl From<crate::io::pipeline::PipelineError> for EngineError {
    fn from(e: crate::io::pipeline::PipelineError) -> Self {
        Self::CorruptData(format!("byte pipeline: {e}"))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
