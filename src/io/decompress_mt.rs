//! Multi-threaded frame-format decompression, built on `mt::DCtx`.
//!
//! A stream produced by `compress_mt::compress_filename_mt` starts with the
//! engine's envelope magic, which happens to fall inside the LZ4
//! skippable-frame range by design; left unhandled, a plain chained-frame
//! reader would just skip it as opaque skippable data. The CLI's
//! `decompress_dispatch::decompress_loop` recognizes the envelope magic
//! inline and routes straight into `mt::DCtx`, since that loop already works
//! over arbitrary `Read`/`Write` streams (stdin, pipes, chained frames) and
//! not just reopenable file paths.
//!
//! [`decompress_filename_mt`] is the file-path equivalent kept here as a
//! standalone entry point for callers that already know they are holding an
//! envelope-format file and want the file-to-file convenience wrapper
//! matching `compress_mt::compress_filename_mt`, without going through the
//! general dispatch loop.

use std::io;

use crate::io::compress_frame::effective_block_size;
use crate::io::decompress_dispatch::DecompressStats;
use crate::io::file_io::{open_dst_file, open_src_file};
use crate::io::prefs::Prefs;
use crate::mt::{DCtx, MtError};

pub(crate) fn mt_err_to_io(e: MtError) -> io::Error {
    io::Error::other(e.to_string())
}

/// Decompresses a single file written in the engine's envelope format using
/// `io_prefs.nb_workers` worker threads.
///
/// `src_filename` must start with the envelope magic; `DCtx::decompress`
/// rejects anything else with `MtError::DataError`.
pub fn decompress_filename_mt(
    src_filename: &str,
    dst_filename: &str,
    io_prefs: &Prefs,
) -> io::Result<DecompressStats> {
    let block_size = effective_block_size(io_prefs);
    let threads = io_prefs.nb_workers.max(1) as usize;
    let mut dctx = DCtx::new(threads, block_size).map_err(mt_err_to_io)?;

    let mut src = open_src_file(src_filename)?;
    let mut dst = open_dst_file(dst_filename, io_prefs)?;

    dctx.decompress(&mut src, &mut dst).map_err(mt_err_to_io)?;
    let counters = dctx.counters();

    Ok(DecompressStats {
        decompressed_bytes: counters.outsize,
    })
}
