//! Single-threaded decompression fallback.
//!
//! Activated when the input's first four bytes are the underlying codec's
//! own frame magic rather than the engine's skippable-envelope magic. No
//! gates, no reorder queue, no worker threads — just the ordinary
//! incremental `frame::lz4f_decompress` loop, so that a file produced by a
//! single-threaded LZ4 frame encoder (or any tool that never heard of this
//! engine) still decodes correctly through the same `DCtx::decompress`
//! entry point.

use super::callbacks::{ReadCb, WriteCb};
use super::error::{MtError, MtResult};
use crate::frame::decompress::{lz4f_create_decompression_context, lz4f_decompress};
use crate::frame::types::LZ4F_VERSION;

/// Drives `frame::lz4f_decompress` directly over `read`/`write`, given the
/// four magic bytes already sniffed by the caller.
///
/// `block_size` bounds how much compressed input is buffered per read; it
/// has no bearing on frame semantics, only on memory footprint.
pub fn decompress_single_threaded(
    prefetched_magic: [u8; 4],
    read: &mut dyn ReadCb,
    write: &mut dyn WriteCb,
    block_size: usize,
) -> MtResult<(u64, u64)> {
    let mut dctx = lz4f_create_decompression_context(LZ4F_VERSION)
        .map_err(MtError::from)?;

    let mut insize: u64 = prefetched_magic.len() as u64;
    let mut outsize: u64 = 0;

    let mut in_buf = vec![0u8; block_size.max(64 * 1024)];
    let mut pending: Vec<u8> = prefetched_magic.to_vec();
    let mut out_buf = vec![0u8; block_size.max(64 * 1024)];

    loop {
        if pending.is_empty() {
            let n = read.read(&mut in_buf)?;
            if n == 0 {
                // Ran out of input before the decoder signalled completion.
                return Err(MtError::FrameDecompress);
            }
            insize += n as u64;
            pending.extend_from_slice(&in_buf[..n]);
        }

        let mut src_pos = 0usize;
        while src_pos < pending.len() {
            let (consumed, produced, hint) =
                lz4f_decompress(&mut dctx, Some(&mut out_buf), &pending[src_pos..], None)
                    .map_err(MtError::from)?;
            src_pos += consumed;
            if produced > 0 {
                let n = write.write(&out_buf[..produced])?;
                if n != produced {
                    return Err(MtError::WriteFail);
                }
                outsize += n as u64;
            }
            if hint == 0 {
                // Frame complete.
                return Ok((insize, outsize));
            }
            if consumed == 0 && produced == 0 {
                // Decoder wants more input than `pending` currently holds.
                break;
            }
        }
        pending.drain(..src_pos);
    }
}
