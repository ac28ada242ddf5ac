//! Reader gate and writer gate: the two serialized sections workers pass
//! through on every iteration of their loop.
//!
//! Both gates are a short-held `Mutex` wrapped around exactly one callback
//! invocation plus the accounting it owns. A worker never holds both at
//! once — each gate's methods lock, do their work, and release before
//! returning, so there is structurally no path that nests one gate inside
//! the other, which is what rules out deadlock between them.

use super::buffer::Entry;
use super::callbacks::{ReadCb, WriteCb};
use super::envelope::{Header, GENERIC_HEADER_LEN};
use super::error::{MtError, MtResult};
use super::reorder::ReorderQueue;
use std::sync::Mutex;

/// Serializes reads from the byte source and assigns each block its frame
/// index. One `ReaderGate` is created per `compress`/`decompress` call and
/// borrowed by every worker for the lifetime of that call.
pub struct ReaderGate<'a> {
    state: Mutex<ReaderState<'a>>,
}

struct ReaderState<'a> {
    read: &'a mut dyn ReadCb,
    frames: u64,
    insize: u64,
    /// Bytes already consumed by the outer dispatcher before any worker ran
    /// (decompression only — the magic-sniffing prefetch that lets the
    /// dispatcher choose this engine's path before a gate ever runs).
    /// Drained by the very first gate read.
    prefetched: Vec<u8>,
    /// Set once a short read (or zero read) has signalled end of stream, so
    /// every worker past that point exits immediately without re-reading.
    eof: bool,
}

impl<'a> ReaderGate<'a> {
    pub fn new(read: &'a mut dyn ReadCb, prefetched: Vec<u8>) -> Self {
        ReaderGate {
            state: Mutex::new(ReaderState {
                read,
                frames: 0,
                insize: 0,
                prefetched,
                eof: false,
            }),
        }
    }

    /// Compress-path acquisition: reads one `block_size`-byte block and
    /// assigns it the next frame index. Returns `None` at end of stream.
    pub fn read_block(&self, block_size: usize) -> MtResult<Option<(u64, Vec<u8>)>> {
        let mut st = self.state.lock().unwrap();
        if st.eof {
            return Ok(None);
        }

        let mut buf = vec![0u8; block_size];
        let mut filled = 0usize;
        if !st.prefetched.is_empty() {
            let n = st.prefetched.len().min(block_size);
            buf[..n].copy_from_slice(&st.prefetched[..n]);
            st.prefetched.drain(..n);
            filled = n;
        }
        if filled < block_size {
            let n = st.read.read(&mut buf[filled..])?;
            filled += n;
        }

        if filled == 0 {
            st.eof = true;
            return Ok(None);
        }
        buf.truncate(filled);

        // A short read always marks end of stream for the compress path:
        // there is no header to distinguish "truncated" from "last block",
        // so any read shorter than requested is simply the final block.
        if filled < block_size {
            st.eof = true;
        }

        let frame = st.frames;
        st.frames += 1;
        st.insize += filled as u64;
        Ok(Some((frame, buf)))
    }

    /// Decompress-path acquisition: reads one envelope header plus its
    /// payload. Returns `None` at a clean end-of-stream boundary (no bytes
    /// available where a header was expected).
    pub fn read_envelope(&self) -> MtResult<Option<(u64, Header, Vec<u8>)>> {
        let mut st = self.state.lock().unwrap();
        if st.eof {
            return Ok(None);
        }

        // First read the 8-byte prefix common to both forms (magic + the
        // remaining-header-length field) — this is what decides whether 4
        // or 8 more header bytes follow. The outer dispatcher has already
        // consumed the first 4 bytes of the whole stream, so frame 0 only
        // needs 4 more to reach here.
        const PREFIX_LEN: usize = 8;
        let mut head = std::mem::take(&mut st.prefetched);
        while head.len() < PREFIX_LEN {
            let want = PREFIX_LEN - head.len();
            let mut chunk = vec![0u8; want];
            let n = st.read.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            chunk.truncate(n);
            head.extend_from_slice(&chunk);
        }

        if head.is_empty() {
            st.eof = true;
            return Ok(None);
        }
        if head.len() < PREFIX_LEN {
            st.eof = true;
            return Err(MtError::DataError);
        }

        // Determine the full header length from the remaining-field, then
        // read the rest of the header before attempting to parse.
        let remaining = u32::from_le_bytes(head[4..8].try_into().unwrap());
        let total_header_len = match remaining {
            4 => GENERIC_HEADER_LEN,
            8 => super::envelope::SIZED_HEADER_LEN,
            _ => {
                st.eof = true;
                return Err(MtError::DataError);
            }
        };
        while head.len() < total_header_len {
            let want = total_header_len - head.len();
            let mut chunk = vec![0u8; want];
            let n = st.read.read(&mut chunk)?;
            if n == 0 {
                st.eof = true;
                return Err(MtError::DataError);
            }
            chunk.truncate(n);
            head.extend_from_slice(&chunk);
        }

        let (header, consumed) = Header::parse(&head)?;
        debug_assert_eq!(consumed, total_header_len);

        let payload_len = header.payload_len as usize;
        let mut payload = vec![0u8; payload_len];
        let mut filled = 0usize;
        while filled < payload_len {
            let n = st.read.read(&mut payload[filled..])?;
            if n == 0 {
                st.eof = true;
                return Err(MtError::DataError);
            }
            filled += n;
        }

        let frame = st.frames;
        st.frames += 1;
        st.insize += (consumed + payload_len) as u64;
        Ok(Some((frame, header, payload)))
    }

    pub fn frames(&self) -> u64 {
        self.state.lock().unwrap().frames
    }

    pub fn insize(&self) -> u64 {
        self.state.lock().unwrap().insize
    }
}

/// Serializes the reorder-queue drain and the sink write for every
/// completed frame.
pub struct WriterGate<'a> {
    state: Mutex<WriterState<'a>>,
}

struct WriterState<'a> {
    write: &'a mut dyn WriteCb,
    queue: ReorderQueue,
    outsize: u64,
}

impl<'a> WriterGate<'a> {
    pub fn new(write: &'a mut dyn WriteCb) -> Self {
        WriterGate {
            state: Mutex::new(WriterState {
                write,
                queue: ReorderQueue::new(),
                outsize: 0,
            }),
        }
    }

    /// Claims a reusable write-list entry, growing its buffer to at least
    /// `min_capacity` bytes.
    pub fn acquire(&self, min_capacity: usize) -> Entry {
        let mut st = self.state.lock().unwrap();
        let mut entry = st.queue.acquire();
        entry.buf.ensure_capacity(min_capacity);
        entry
    }

    /// Returns a claimed entry to the free list without writing it — used
    /// when a worker hits EOF or an error before producing output.
    pub fn release(&self, entry: Entry) {
        self.state.lock().unwrap().queue.release(entry);
    }

    /// Commits `entry` as the output for `frame`, draining every
    /// contiguous in-order run to the sink.
    pub fn commit(&self, entry: Entry, frame: u64) -> MtResult<()> {
        let mut st = self.state.lock().unwrap();
        let WriterState { write, queue, outsize } = &mut *st;
        queue.commit(entry, frame, &mut |bytes: &[u8]| -> MtResult<()> {
            let n = write.write(bytes)?;
            if n != bytes.len() {
                return Err(MtError::WriteFail);
            }
            *outsize += n as u64;
            Ok(())
        })
    }

    pub fn outsize(&self) -> u64 {
        self.state.lock().unwrap().outsize
    }

    /// `true` once every frame that was ever committed has been drained —
    /// used by the orchestrator to detect a stalled pipeline (should never
    /// happen on the happy path; surfaced via a debug assertion at call
    /// sites instead of a public API).
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().queue.pending()
    }
}
