//! Buffer and buffer-pool entries shared between workers under the writer gate.
//!
//! Grounded in `examples/original_source/lib/zstdmt_compress.c`'s
//! `ZSTDMT_buffer` / `write_list_t` structures, reworked per the redesign
//! note in the specification: rather than an intrusive linked list threaded
//! through each buffer, entries live in plain `Vec`s indexed by position, and
//! membership in the free/busy/done sets is tracked by where an `Entry`
//! currently resides rather than by next/prev pointers.

/// An owned, resizable output buffer reused across frames.
#[derive(Debug, Default)]
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// Creates an empty buffer with no reserved capacity.
    pub fn new() -> Self {
        Buffer { data: Vec::new() }
    }

    /// Creates an empty buffer with at least `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Buffer {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes currently holding meaningful content.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total reserved capacity.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Truncates to zero length, retaining the allocation for reuse.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Ensures at least `capacity` bytes are reserved, growing if necessary.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if self.data.capacity() < capacity {
            let extra = capacity - self.data.len();
            self.data.reserve(extra);
        }
    }

    /// Grows the underlying allocation to exactly `capacity` bytes worth of
    /// room, used by workers that need a `&mut [u8]` of a known worst-case
    /// size to write into before the final length is known.
    ///
    /// Resizes the visible length to `capacity` filled with zero, returning
    /// it for the caller to shrink back with [`Buffer::set_len`] once the
    /// actual payload length is known.
    pub fn resize_to(&mut self, capacity: usize) {
        if self.data.len() < capacity {
            self.data.resize(capacity, 0);
        } else {
            self.data.truncate(capacity);
        }
    }

    /// Shrinks the visible length without touching the allocation.
    ///
    /// # Panics
    /// Panics if `len` exceeds the current length.
    pub fn set_len(&mut self, len: usize) {
        assert!(len <= self.data.len());
        self.data.truncate(len);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Appends `src` to the end of the buffer, growing the allocation as needed.
    pub fn extend_from_slice(&mut self, src: &[u8]) {
        self.data.extend_from_slice(src);
    }
}

/// A buffer tagged with the frame index it holds, the unit exchanged between
/// the free, busy, and done sets managed by [`super::reorder::ReorderQueue`].
#[derive(Debug, Default)]
pub struct Entry {
    /// Monotonic frame sequence number this entry was filled for.
    ///
    /// Meaningless while the entry sits in the free set; set by the worker
    /// that claims it before compression/decompression begins.
    pub frame: u64,
    pub buf: Buffer,
}

impl Entry {
    pub fn new() -> Self {
        Entry {
            frame: 0,
            buf: Buffer::new(),
        }
    }
}
