//! Byte-level sinks and cursors (§4.2) built on top of the raw codec
//! primitives in [`crate::codec`].

mod cursor;
mod pool;
mod sink;

pub use cursor::ReadCursor;
pub use pool::{PooledSink, SinkPool, global as sink_pool};
pub use sink::GrowableSink;
