//! Multi-threaded frame-format compression, built on `mt::CCtx`.
//!
//! Thin file-level wrapper: resolve source/destination, build the same
//! [`Preferences`] and dictionary [`compress_frame`] would, then hand the
//! open file handles straight to the parallel framing engine. All the actual
//! block splitting, worker dispatch, and envelope framing lives in `crate::mt`.

use std::io;

use crate::io::compress_frame::{build_preferences, create_cdict, effective_block_size, CompressStats};
use crate::io::file_io::{open_dst_file, open_src_file};
use crate::io::prefs::{display_level, Prefs};
use crate::mt::{CCtx, MtError};

fn mt_err_to_io(e: MtError) -> io::Error {
    io::Error::other(e.to_string())
}

fn log_thread_count(threads: usize) {
    display_level(3, &format!("Compressing with {} worker thread(s) \n", threads));
}

/// Compresses a single file into the engine's envelope format using
/// `io_prefs.nb_workers` worker threads.
///
/// Equivalent in spirit to `compress_frame::compress_filename_ext`, but
/// dispatches to `mt::CCtx` instead of the single-threaded streaming loop.
/// Timing display is the caller's responsibility, matching the
/// single-threaded path's `compress_filename_st`.
pub fn compress_filename_mt(
    src_filename: &str,
    dst_filename: &str,
    compression_level: i32,
    io_prefs: &Prefs,
) -> io::Result<CompressStats> {
    let mut prefs = build_preferences(io_prefs);
    prefs.compression_level = compression_level;

    let cdict = create_cdict(io_prefs)?;
    let block_size = effective_block_size(io_prefs);
    let threads = io_prefs.nb_workers.max(1) as usize;
    log_thread_count(threads);

    let mut cctx = CCtx::new(threads, block_size, prefs).map_err(mt_err_to_io)?;
    if let Some(cdict) = cdict {
        cctx = cctx.with_cdict(cdict);
    }

    let mut src = open_src_file(src_filename)?;
    let mut dst = open_dst_file(dst_filename, io_prefs)?;

    cctx.compress(&mut src, &mut dst).map_err(mt_err_to_io)?;
    let counters = cctx.counters();

    Ok(CompressStats {
        bytes_in: counters.insize,
        bytes_out: counters.outsize,
    })
}
