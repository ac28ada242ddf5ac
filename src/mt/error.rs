//! Error taxonomy for the parallel framing engine.
//!
//! Mirrors the `LZ4MT_error_code` / `ZSTDMT_error_code` enumerations used by
//! `examples/original_source/lib/lz4mt_compress.c` and
//! `lz4mt_decompress.c` — every worker, gate, and context-state-machine
//! failure collapses into one of these variants so callers can match on a
//! single closed set rather than distinguishing `io::Error`, allocator
//! failure, and the underlying frame codec's own error type.

use crate::frame::types::Lz4FError;

/// Error produced by the multi-threaded compression/decompression engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtError {
    /// The global allocator failed to provide a buffer or worker resource.
    MemoryAllocation,
    /// The caller's [`ReadCb`](super::callbacks::ReadCb) reported failure.
    ReadFail,
    /// The caller's [`WriteCb`](super::callbacks::WriteCb) reported failure.
    WriteFail,
    /// Malformed input: bad magic, truncated header, inconsistent envelope.
    DataError,
    /// The underlying codec failed while compressing a block.
    FrameCompress,
    /// The underlying codec failed while decompressing a block.
    FrameDecompress,
    /// A requested parameter (thread count, block size, ...) is out of range.
    CompressionParameterUnsupported,
    /// The underlying frame codec reported an error of its own.
    CompressionLibrary(Lz4FError),
    /// The read or write callback requested cancellation.
    Canceled,
    /// The context is in `Poisoned` state and cannot accept new work.
    ContextPoisoned,
}

impl std::fmt::Display for MtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MtError::MemoryAllocation => write!(f, "memory allocation failed"),
            MtError::ReadFail => write!(f, "read callback failed"),
            MtError::WriteFail => write!(f, "write callback failed"),
            MtError::DataError => write!(f, "malformed input data"),
            MtError::FrameCompress => write!(f, "frame compression failed"),
            MtError::FrameDecompress => write!(f, "frame decompression failed"),
            MtError::CompressionParameterUnsupported => {
                write!(f, "unsupported compression parameter")
            }
            MtError::CompressionLibrary(e) => write!(f, "compression library error: {:?}", e),
            MtError::Canceled => write!(f, "operation canceled"),
            MtError::ContextPoisoned => write!(f, "context is poisoned and must be recreated"),
        }
    }
}

impl std::error::Error for MtError {}

impl From<Lz4FError> for MtError {
    fn from(e: Lz4FError) -> Self {
        MtError::CompressionLibrary(e)
    }
}

pub type MtResult<T> = Result<T, MtError>;
