//! Per-thread worker loop.
//!
//! Each worker is a plain OS thread spawned inside `std::thread::scope` by
//! `mt::context`. It owns its own underlying-codec state — never shared —
//! and passes through the reader gate and writer gate exactly once per
//! frame, with the actual compress/decompress work done lock-free in
//! between.

use super::envelope::{Header, SizeHint, CODEC_FAMILY_LZ4F};
use super::error::{MtError, MtResult};
use super::gates::{ReaderGate, WriterGate};
use crate::frame::cdict::Lz4FCDict;
use crate::frame::compress::{lz4f_compress_frame_using_cdict, Lz4FCCtx};
use crate::frame::decompress::{lz4f_create_decompression_context, lz4f_decompress, Lz4FDCtx};
use crate::frame::header::lz4f_compress_frame_bound;
use crate::frame::types::{Preferences, LZ4F_VERSION};

/// Bound on doubling retries for a compressed block that didn't fit the
/// worst-case estimate. The cap is deterministic so a pathological input
/// fails fast instead of growing the buffer without limit.
const GROW_RETRY_LIMIT: u32 = 4;

/// One compress worker's full run: loop until the reader gate signals EOF
/// or any step fails.
pub fn run_compress_worker(
    reader: &ReaderGate<'_>,
    writer: &WriterGate<'_>,
    block_size: usize,
    prefs: &Preferences,
    cdict: Option<&Lz4FCDict>,
) -> MtResult<()> {
    let mut cctx: Box<Lz4FCCtx> = Lz4FCCtx::new(LZ4F_VERSION);

    loop {
        // 1. Under the writer gate: claim a buffer sized for the worst case.
        let worst_case = lz4f_compress_frame_bound(block_size, Some(prefs))
            + super::envelope::SIZED_HEADER_LEN;
        let mut entry = writer.acquire(worst_case);

        // 2. Under the reader gate: pull the next block.
        let (frame, block) = match reader.read_block(block_size) {
            Ok(Some(v)) => v,
            Ok(None) => {
                writer.release(entry);
                return Ok(());
            }
            Err(e) => {
                writer.release(entry);
                return Err(e);
            }
        };

        // 3. Lock-free: compress the block, growing the buffer on overflow.
        // The hint only fits blocks up to 65535*64KiB; beyond that the
        // header falls back to its generic (unhinted) form.
        let cdict_ptr = cdict.map_or(std::ptr::null(), |d| d as *const Lz4FCDict);
        let hint = SizeHint::from_uncompressed_len(CODEC_FAMILY_LZ4F, block.len() as u64);
        let header_cap = if hint.is_some() {
            super::envelope::SIZED_HEADER_LEN
        } else {
            super::envelope::GENERIC_HEADER_LEN
        };

        let mut attempt = 0;
        let payload_len = loop {
            let cap = entry.buf.capacity().max(header_cap + 1);
            entry.buf.resize_to(cap);
            let dst = entry.buf.as_mut_slice();
            match lz4f_compress_frame_using_cdict(
                &mut *cctx,
                &mut dst[header_cap..],
                &block,
                cdict_ptr,
                Some(prefs),
            ) {
                Ok(n) => break n,
                Err(_) if attempt < GROW_RETRY_LIMIT => {
                    attempt += 1;
                    let new_cap = entry.buf.capacity() * 2;
                    entry.buf.ensure_capacity(new_cap);
                    continue;
                }
                Err(_) => {
                    writer.release(entry);
                    return Err(MtError::FrameCompress);
                }
            }
        };

        let header = Header {
            payload_len: payload_len as u32,
            hint,
        };
        let header_len = header.encoded_len();
        debug_assert_eq!(header_len, header_cap);
        header.encode_into(&mut entry.buf.as_mut_slice()[..header_len]);
        entry.buf.set_len(header_len + payload_len);

        // 4. Under the writer gate: publish in frame order.
        if let Err(e) = writer.commit(entry, frame) {
            return Err(e);
        }
    }
}

/// One decompress worker's full run.
pub fn run_decompress_worker(reader: &ReaderGate<'_>, writer: &WriterGate<'_>) -> MtResult<()> {
    loop {
        let entry = writer.acquire(0);

        let (frame, header, payload) = match reader.read_envelope() {
            Ok(Some(v)) => v,
            Ok(None) => {
                writer.release(entry);
                return Ok(());
            }
            Err(e) => {
                writer.release(entry);
                return Err(e);
            }
        };

        let initial_cap = header
            .hint
            .map(|h| h.min_uncompressed_bytes() as usize)
            .unwrap_or(64 * 1024);
        let mut entry = entry;
        entry.buf.ensure_capacity(initial_cap);

        match decode_one_frame(&payload, &mut entry.buf, initial_cap) {
            Ok(()) => {}
            Err(e) => {
                writer.release(entry);
                return Err(e);
            }
        }

        if let Err(e) = writer.commit(entry, frame) {
            return Err(e);
        }
    }
}

/// Decodes exactly one complete LZ4 frame (`payload`) into `buf`, growing
/// `buf`'s capacity as needed past the hint-derived starting size.
fn decode_one_frame(
    payload: &[u8],
    buf: &mut super::buffer::Buffer,
    initial_cap: usize,
) -> MtResult<()> {
    let mut dctx: Box<Lz4FDCtx> =
        lz4f_create_decompression_context(LZ4F_VERSION).map_err(MtError::from)?;

    buf.clear();
    buf.resize_to(initial_cap.max(64 * 1024));

    let mut src_pos = 0usize;
    let mut dst_pos = 0usize;
    loop {
        if dst_pos == buf.capacity() {
            let new_cap = buf.capacity() * 2;
            buf.resize_to(new_cap);
        }
        let (consumed, produced, hint) = {
            let dst = buf.as_mut_slice();
            lz4f_decompress(&mut dctx, Some(&mut dst[dst_pos..]), &payload[src_pos..], None)
                .map_err(MtError::from)?
        };
        src_pos += consumed;
        dst_pos += produced;
        if hint == 0 {
            buf.set_len(dst_pos);
            return Ok(());
        }
        if consumed == 0 && produced == 0 {
            // No destination room was the only legal reason for a stall,
            // and the loop top always grows before calling again, so a
            // stall here means the payload ran out mid-frame.
            return Err(MtError::FrameDecompress);
        }
        if src_pos >= payload.len() && hint != 0 {
            return Err(MtError::FrameDecompress);
        }
    }
}
