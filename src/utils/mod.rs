//! Ambient-stack helpers shared across the crate: structured logging setup
//! and centralized numeric conversions.
pub mod logger;
pub mod num;
