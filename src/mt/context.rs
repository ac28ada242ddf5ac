//! `CCtx` / `DCtx`: the public entry points of the parallel framing engine.
//!
//! Each context owns its configuration and its running totals, and enforces
//! a Fresh → Running → Fresh/Poisoned state machine: a context starts Fresh,
//! moves to Poisoned on any error, and otherwise returns to Fresh so it can
//! be reused for another stream. `compress`/`decompress` take `&mut self`, so
//! Rust's borrow checker already rules out two calls racing on the same
//! context; the `Poisoned` flag only needs to survive between calls.

use super::callbacks::{ReadCb, WriteCb};
use super::error::{MtError, MtResult};
use super::fallback::decompress_single_threaded;
use super::gates::{ReaderGate, WriterGate};
use super::worker::{run_compress_worker, run_decompress_worker};
use crate::config::{MT_BLOCK_SIZE_MAX, MT_THREADS_MAX};
use crate::frame::cdict::Lz4FCDict;
use crate::frame::types::{Preferences, LZ4F_MAGICNUMBER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextState {
    Fresh,
    Poisoned,
}

/// Running totals exposed after a `compress`/`decompress` call completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub insize: u64,
    pub outsize: u64,
    pub frames: u64,
}

fn validate_params(threads: usize, block_size: usize) -> MtResult<()> {
    if threads == 0 || threads > MT_THREADS_MAX {
        return Err(MtError::CompressionParameterUnsupported);
    }
    if block_size == 0 || block_size as u64 > MT_BLOCK_SIZE_MAX {
        return Err(MtError::CompressionParameterUnsupported);
    }
    Ok(())
}

/// Multi-threaded compression context. One instance compresses one stream
/// per `compress` call; the same instance may be reused for the next stream
/// once it returns to the `Fresh` state.
pub struct CCtx {
    threads: usize,
    block_size: usize,
    prefs: Preferences,
    cdict: Option<Box<Lz4FCDict>>,
    state: ContextState,
    counters: Counters,
}

impl CCtx {
    pub fn new(threads: usize, block_size: usize, prefs: Preferences) -> MtResult<Self> {
        validate_params(threads, block_size)?;
        Ok(CCtx {
            threads,
            block_size,
            prefs,
            cdict: None,
            state: ContextState::Fresh,
            counters: Counters::default(),
        })
    }

    /// Attaches a pre-digested dictionary shared read-only by every worker.
    pub fn with_cdict(mut self, cdict: Box<Lz4FCDict>) -> Self {
        self.cdict = Some(cdict);
        self
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Compresses everything `read` yields into the engine's envelope
    /// format, writing each compressed frame to `write` in input order.
    ///
    /// Spawns `threads` worker threads via `std::thread::scope`; the first
    /// error observed across all workers (by join order, which is
    /// deterministic for a given spawn order) is returned and the context
    /// moves to `Poisoned`. On success the context returns to `Fresh` and
    /// may be reused.
    pub fn compress(&mut self, read: &mut dyn ReadCb, write: &mut dyn WriteCb) -> MtResult<()> {
        if self.state == ContextState::Poisoned {
            return Err(MtError::ContextPoisoned);
        }

        let result = self.compress_inner(read, write);
        self.state = if result.is_ok() {
            ContextState::Fresh
        } else {
            ContextState::Poisoned
        };
        result
    }

    fn compress_inner(&mut self, read: &mut dyn ReadCb, write: &mut dyn WriteCb) -> MtResult<()> {
        let reader = ReaderGate::new(read, Vec::new());
        let writer = WriterGate::new(write);

        let block_size = self.block_size;
        let prefs = self.prefs;
        let cdict = self.cdict.as_deref();
        let threads = self.threads;

        let first_err = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(|| run_compress_worker(&reader, &writer, block_size, &prefs, cdict))
                })
                .collect();

            let mut first_err = None;
            for h in handles {
                let outcome = h.join().unwrap_or(Err(MtError::MemoryAllocation));
                if let Err(e) = outcome {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
            first_err
        });

        self.counters = Counters {
            insize: reader.insize(),
            outsize: writer.outsize(),
            frames: reader.frames(),
        };

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Multi-threaded decompression context.
///
/// Transparently handles both this engine's own envelope stream and a plain
/// single-threaded frame produced by any ordinary LZ4 frame encoder: the
/// first four bytes of the stream decide which path runs, so a caller never
/// needs to know in advance how a given input was produced.
pub struct DCtx {
    threads: usize,
    block_size: usize,
    state: ContextState,
    counters: Counters,
}

impl DCtx {
    pub fn new(threads: usize, block_size: usize) -> MtResult<Self> {
        validate_params(threads, block_size)?;
        Ok(DCtx {
            threads,
            block_size,
            state: ContextState::Fresh,
            counters: Counters::default(),
        })
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn decompress(&mut self, read: &mut dyn ReadCb, write: &mut dyn WriteCb) -> MtResult<()> {
        if self.state == ContextState::Poisoned {
            return Err(MtError::ContextPoisoned);
        }

        let result = self.decompress_inner(read, write);
        self.state = if result.is_ok() {
            ContextState::Fresh
        } else {
            ContextState::Poisoned
        };
        result
    }

    /// Like [`DCtx::decompress`], but for callers that have already consumed
    /// the stream's leading 4 magic bytes themselves — typically a dispatcher
    /// (`io::decompress_dispatch`) that reads the magic to choose between this
    /// engine's envelope format, the plain LZ4 frame format, and the legacy
    /// format before committing to a decoder.
    ///
    /// The caller is trusted to have already confirmed `magic` is not some
    /// other format this context shouldn't attempt (the dispatcher's own
    /// magic-number switch already does this); this entry point re-validates
    /// it regardless, same as [`DCtx::decompress`] does internally.
    pub fn decompress_with_prefetched_magic(
        &mut self,
        magic: [u8; 4],
        read: &mut dyn ReadCb,
        write: &mut dyn WriteCb,
    ) -> MtResult<()> {
        if self.state == ContextState::Poisoned {
            return Err(MtError::ContextPoisoned);
        }

        let result = self.decompress_from_magic(magic, read, write);
        self.state = if result.is_ok() {
            ContextState::Fresh
        } else {
            ContextState::Poisoned
        };
        result
    }

    fn decompress_inner(&mut self, read: &mut dyn ReadCb, write: &mut dyn WriteCb) -> MtResult<()> {
        let mut magic = [0u8; 4];
        let n = read.read(&mut magic)?;
        if n == 0 {
            self.counters = Counters::default();
            return Ok(());
        }
        if n < 4 {
            return Err(MtError::DataError);
        }

        self.decompress_from_magic(magic, read, write)
    }

    fn decompress_from_magic(
        &mut self,
        magic: [u8; 4],
        read: &mut dyn ReadCb,
        write: &mut dyn WriteCb,
    ) -> MtResult<()> {
        if u32::from_le_bytes(magic) == LZ4F_MAGICNUMBER {
            let (insize, outsize) =
                decompress_single_threaded(magic, read, write, self.block_size)?;
            self.counters = Counters {
                insize,
                outsize,
                frames: 1,
            };
            return Ok(());
        }

        if !super::envelope::is_envelope_magic(u32::from_le_bytes(magic)) {
            return Err(MtError::DataError);
        }

        let reader = ReaderGate::new(read, magic.to_vec());
        let writer = WriterGate::new(write);
        let threads = self.threads;

        let first_err = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| scope.spawn(|| run_decompress_worker(&reader, &writer)))
                .collect();

            let mut first_err = None;
            for h in handles {
                let outcome = h.join().unwrap_or(Err(MtError::MemoryAllocation));
                if let Err(e) = outcome {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
            first_err
        });

        self.counters = Counters {
            insize: reader.insize(),
            outsize: writer.outsize(),
            frames: reader.frames(),
        };

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_threads() {
        assert_eq!(
            CCtx::new(0, 64 * 1024, Preferences::default()).unwrap_err(),
            MtError::CompressionParameterUnsupported
        );
    }

    #[test]
    fn rejects_too_many_threads() {
        assert_eq!(
            CCtx::new(MT_THREADS_MAX + 1, 64 * 1024, Preferences::default()).unwrap_err(),
            MtError::CompressionParameterUnsupported
        );
    }

    #[test]
    fn single_threaded_round_trip() {
        let src = b"hello world, hello world, hello world".repeat(100);
        let mut compressed = Vec::new();
        let mut cctx = CCtx::new(2, 64 * 1024, Preferences::default()).unwrap();
        let mut src_reader: &[u8] = &src;
        cctx.compress(&mut src_reader, &mut compressed).unwrap();
        assert!(cctx.counters().frames >= 1);

        let mut restored = Vec::new();
        let mut dctx = DCtx::new(2, 64 * 1024).unwrap();
        let mut comp_reader: &[u8] = &compressed;
        dctx.decompress(&mut comp_reader, &mut restored).unwrap();
        assert_eq!(restored, src);
    }

    #[test]
    fn poisoned_context_short_circuits() {
        let mut cctx = CCtx::new(1, 64 * 1024, Preferences::default()).unwrap();
        struct FailingRead;
        impl ReadCb for FailingRead {
            fn read(&mut self, _buf: &mut [u8]) -> MtResult<usize> {
                Err(MtError::ReadFail)
            }
        }
        let mut read = FailingRead;
        let mut out = Vec::new();
        assert!(cctx.compress(&mut read, &mut out).is_err());
        assert_eq!(
            cctx.compress(&mut read, &mut out).unwrap_err(),
            MtError::ContextPoisoned
        );
    }
}
