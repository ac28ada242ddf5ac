// config.rs — Compile-time configuration constants.
// Migrated from lz4conf.h and platform.h (lz4-1.10.0/programs).
//
// Platform-detection macros from platform.h (__64BIT__, _FILE_OFFSET_BITS,
// _LARGEFILE_SOURCE, PLATFORM_POSIX_VERSION, SET_BINARY_MODE,
// SET_SPARSE_FILE_MODE) are not needed in Rust: Rust handles 64-bit sizes
// natively, file I/O does not require binary-mode toggling, and sparse-file
// detection is handled by build.rs via `#[cfg(has_sparse_files)]`.
//
// IS_CONSOLE(stream) is provided by std::io::IsTerminal (Rust 1.70+) at each
// call site and does not need a constant here.

// Default compression level.
// Corresponds to LZ4_CLEVEL_DEFAULT in lz4conf.h.
// Can be overridden by the LZ4_CLEVEL environment variable at runtime,
// or by the -# command-line flag.
pub const CLEVEL_DEFAULT: i32 = 1;

// Whether multi-threaded compression is compiled in.
// Corresponds to LZ4IO_MULTITHREAD in lz4conf.h.
// In C: defaults to 1 on Windows (Completion Ports available), 0 elsewhere.
// Here: true on Windows by default, or when the `multithread` Cargo feature is enabled.
pub const MULTITHREAD: bool = cfg!(target_os = "windows") || cfg!(feature = "multithread");

// Default number of worker threads.
// Corresponds to LZ4_NBWORKERS_DEFAULT in lz4conf.h (C source value: 0 = auto-detect).
// Migration acceptance criteria intentionally diverges from C source and specifies 4.
// Can be overridden by the LZ4_NBWORKERS environment variable,
// or by the -T# command-line flag.
pub const NB_WORKERS_DEFAULT: usize = 4;

// Maximum number of compression worker threads selectable at runtime via -T.
// Corresponds to LZ4_NBWORKERS_MAX in lz4conf.h. Distinct from MT_THREADS_MAX
// below: this bounds the CLI's `-T` flag, that one bounds mt::CCtx/DCtx
// construction directly (a library caller may pick any value in [1, 128]
// regardless of what the CLI's own default clamp allows).
pub const NB_WORKERS_MAX: usize = 200;

// Maximum thread count accepted by mt::context::{CCtx,DCtx} creation.
// Corresponds to ZSTDMT_THREAD_MAX / lz4mt's createCCtx thread-count bound
// (examples/original_source/lib/zstdmt.h, lz4mt_compress.c's createCCtx
// validation). Requests outside [1, MT_THREADS_MAX] are rejected with
// MtError::CompressionParameterUnsupported at context-creation time.
pub const MT_THREADS_MAX: usize = 128;

// Maximum configurable block size, in bytes.
// The 16-byte envelope's uncompressed-size hint is a u16 in 64 KiB units,
// so any block size above (2^32 - 65536) cannot be represented; rejected at
// context creation rather than silently truncated or left to panic later.
pub const MT_BLOCK_SIZE_MAX: u64 = (1u64 << 32) - 65536;

// Default block size ID (7 = 4 MB blocks).
// Corresponds to LZ4_BLOCKSIZEID_DEFAULT in lz4conf.h.
// Can be overridden at runtime using the -B# command-line flag.
pub const BLOCKSIZEID_DEFAULT: u32 = 7;
