//! Parallel block-oriented compression/decompression framing engine.
//!
//! Wraps the single-threaded LZ4 frame codec (`crate::frame`) in a pool of
//! worker threads that each compress or decompress one block at a time,
//! publishing results through a reorder queue so the output stream is
//! byte-identical to what a single-threaded encoder would have produced in
//! block order, just framed as a sequence of skippable envelopes instead of
//! one frame, with the wire format and the gate/queue design documented on
//! each submodule in turn.

mod buffer;
mod callbacks;
mod context;
mod envelope;
mod error;
mod fallback;
mod gates;
mod reorder;
mod worker;

pub use callbacks::{CancelableReader, CancelableWriter, ReadCb, WriteCb};
pub use context::{CCtx, Counters, DCtx};
pub use envelope::{is_envelope_magic, Header, SizeHint, CODEC_FAMILY_LZ4F};
pub use error::{MtError, MtResult};
