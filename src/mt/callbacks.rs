//! Read/write callback contract for the parallel framing engine.
//!
//! The engine never touches a file handle, socket, or `Vec<u8>` directly —
//! every byte enters and leaves through one of these two traits. This is the
//! Rust equivalent of a C-style `readCb`/`writeCb` function-pointer-plus-
//! `void*` contract, expressed as trait objects instead (the closure/struct
//! *is* the user arg in this binding).

use super::error::{MtError, MtResult};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fills as much of `buf` as the source has available.
///
/// `Ok(0)` means end-of-stream. Any other `Ok(n)` with `n < buf.len()` is a
/// short read and is only legal at a block boundary (the reader gate decides
/// whether that is acceptable — see `mt::gates`).
pub trait ReadCb: Send {
    fn read(&mut self, buf: &mut [u8]) -> MtResult<usize>;
}

/// Writes all of `buf` to the sink.
pub trait WriteCb: Send {
    fn write(&mut self, buf: &[u8]) -> MtResult<usize>;
}

// Blanket impls so any `std::io::Read`/`std::io::Write` (files, pipes, the
// `io::file_io` adapters) work as a callback without a bespoke wrapper.

impl<R: Read + Send> ReadCb for R {
    fn read(&mut self, buf: &mut [u8]) -> MtResult<usize> {
        let mut total = 0;
        while total < buf.len() {
            match Read::read(self, &mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => return Err(MtError::ReadFail),
            }
        }
        Ok(total)
    }
}

impl<W: Write + Send> WriteCb for W {
    fn write(&mut self, buf: &[u8]) -> MtResult<usize> {
        self.write_all(buf).map_err(|_| MtError::WriteFail)?;
        Ok(buf.len())
    }
}

/// Wraps any [`std::io::Read`] with an out-of-band cancellation flag.
///
/// Spec.md §4.4 encodes cancellation as a distinguished callback return code
/// (`-2`); in Rust that becomes `Err(MtError::Canceled)`. Tests (and, in the
/// future, a `Ctrl-C` handler) flip the shared flag and the next callback
/// invocation observes it before touching the inner reader.
pub struct CancelableReader<R> {
    inner: R,
    canceled: Arc<AtomicBool>,
}

impl<R: Read> CancelableReader<R> {
    pub fn new(inner: R, canceled: Arc<AtomicBool>) -> Self {
        CancelableReader { inner, canceled }
    }
}

impl<R: Read + Send> ReadCb for CancelableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> MtResult<usize> {
        if self.canceled.load(Ordering::Relaxed) {
            return Err(MtError::Canceled);
        }
        let mut total = 0;
        while total < buf.len() {
            match self.inner.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => return Err(MtError::ReadFail),
            }
        }
        Ok(total)
    }
}

/// Wraps any [`std::io::Write`] with the same cancellation contract as
/// [`CancelableReader`].
pub struct CancelableWriter<W> {
    inner: W,
    canceled: Arc<AtomicBool>,
}

impl<W: Write> CancelableWriter<W> {
    pub fn new(inner: W, canceled: Arc<AtomicBool>) -> Self {
        CancelableWriter { inner, canceled }
    }
}

impl<W: Write + Send> WriteCb for CancelableWriter<W> {
    fn write(&mut self, buf: &[u8]) -> MtResult<usize> {
        if self.canceled.load(Ordering::Relaxed) {
            return Err(MtError::Canceled);
        }
        self.inner.write_all(buf).map_err(|_| MtError::WriteFail)?;
        Ok(buf.len())
    }
}
