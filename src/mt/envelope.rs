//! Skippable-frame envelope wrapping each compressed block.
//!
//! Every block produced by the parallel engine is wrapped in an LZ4
//! skippable frame with the fixed magic `0x184D2A50` so that a
//! single-threaded reader of the underlying frame codec can skip straight
//! over it, while a parallel reader recovers the block boundaries and,
//! optionally, a hint of the uncompressed size without decompressing first.
//! The magic is checked for exact equality, not membership in the broader
//! skippable-frame family (`0x184D2A50..=0x184D2A5F`): any other member of
//! that family is a third party's skippable chunk, not this engine's
//! envelope, and must be left alone rather than misread as one.
//!
//! Two header forms are supported:
//!
//! - **Generic** (12 bytes): `magic(4) | hdr_len(4)=4 | payload_len(4)`
//! - **Sized** (16 bytes): `magic(4) | hdr_len(4)=8 | payload_len(4) |
//!   codec_family(2) | hint_64k(2)`
//!
//! The sized form is grounded in `lz4mt_decompress.c`'s `read_le64`-based
//! 8-byte trailing-header path (`examples/original_source`), which records
//! an uncompressed-size hint in 64 KiB units alongside a short marker
//! identifying which single-threaded codec family produced the payload.

use super::error::{MtError, MtResult};

/// This engine's skippable-frame magic number. Checked for exact equality —
/// other values in the broader skippable-frame family are not this envelope.
pub const ENVELOPE_MAGIC: u32 = 0x184D_2A50;

/// Codec-family marker for LZ4F payloads, stored in the sized header form.
pub const CODEC_FAMILY_LZ4F: u16 = 0x464C;

const GENERIC_REMAINING: u32 = 4;
const SIZED_REMAINING: u32 = 8;

/// Number of bytes in the generic (hint-less) envelope header.
pub const GENERIC_HEADER_LEN: usize = 12;
/// Number of bytes in the sized (hint-carrying) envelope header.
pub const SIZED_HEADER_LEN: usize = 16;

/// One parsed or to-be-encoded envelope header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Length of the compressed payload that follows the header, in bytes.
    pub payload_len: u32,
    /// Uncompressed-size hint, present only on the sized form.
    pub hint: Option<SizeHint>,
}

/// Uncompressed-size hint carried by the sized envelope form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeHint {
    /// Identifies which single-threaded codec produced the payload.
    pub codec_family: u16,
    /// Uncompressed size in 64 KiB units, rounded up.
    pub units_64k: u16,
}

impl SizeHint {
    /// Smallest uncompressed size (in bytes) this hint guarantees covering.
    ///
    /// Per the end-to-end scenario in which `hint * 65536 >= uncompressedBlockSize`,
    /// callers size their initial output buffer to this value and grow on overflow.
    pub fn min_uncompressed_bytes(&self) -> u64 {
        (self.units_64k as u64) * 65536
    }

    /// Builds a hint from an uncompressed size, rounding up to the next 64 KiB unit.
    /// Returns `None` if the size does not fit in the 16-bit unit count.
    pub fn from_uncompressed_len(codec_family: u16, len: u64) -> Option<SizeHint> {
        let units = len.div_ceil(65536);
        if units > u16::MAX as u64 {
            return None;
        }
        Some(SizeHint {
            codec_family,
            units_64k: units as u16,
        })
    }
}

impl Header {
    /// Total number of bytes this header occupies when encoded.
    pub fn encoded_len(&self) -> usize {
        if self.hint.is_some() {
            SIZED_HEADER_LEN
        } else {
            GENERIC_HEADER_LEN
        }
    }

    /// Encodes the header into `dst`, returning the number of bytes written.
    ///
    /// `dst` must be at least [`Header::encoded_len`] bytes long.
    pub fn encode_into(&self, dst: &mut [u8]) -> usize {
        let len = self.encoded_len();
        assert!(dst.len() >= len, "destination buffer too small for envelope header");

        dst[0..4].copy_from_slice(&ENVELOPE_MAGIC.to_le_bytes());
        match self.hint {
            None => {
                dst[4..8].copy_from_slice(&GENERIC_REMAINING.to_le_bytes());
                dst[8..12].copy_from_slice(&self.payload_len.to_le_bytes());
            }
            Some(hint) => {
                dst[4..8].copy_from_slice(&SIZED_REMAINING.to_le_bytes());
                dst[8..12].copy_from_slice(&self.payload_len.to_le_bytes());
                dst[12..14].copy_from_slice(&hint.codec_family.to_le_bytes());
                dst[14..16].copy_from_slice(&hint.units_64k.to_le_bytes());
            }
        }
        len
    }

    /// Parses a header from the start of `bytes`.
    ///
    /// Returns the parsed header and the number of bytes it occupied.
    /// `bytes[0..4]` is assumed to already be known-plausible by the caller
    /// dispatch layer (it is how the engine distinguishes an envelope from a
    /// foreign frame's own magic in the first place); this function still
    /// re-validates it so it can be called directly in tests.
    pub fn parse(bytes: &[u8]) -> MtResult<(Header, usize)> {
        if bytes.len() < 8 {
            return Err(MtError::DataError);
        }
        let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        if magic != ENVELOPE_MAGIC {
            return Err(MtError::DataError);
        }
        let remaining = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        match remaining {
            GENERIC_REMAINING => {
                if bytes.len() < GENERIC_HEADER_LEN {
                    return Err(MtError::DataError);
                }
                let payload_len = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
                Ok((
                    Header {
                        payload_len,
                        hint: None,
                    },
                    GENERIC_HEADER_LEN,
                ))
            }
            SIZED_REMAINING => {
                if bytes.len() < SIZED_HEADER_LEN {
                    return Err(MtError::DataError);
                }
                let payload_len = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
                let codec_family = u16::from_le_bytes(bytes[12..14].try_into().unwrap());
                if codec_family != CODEC_FAMILY_LZ4F {
                    return Err(MtError::DataError);
                }
                let units_64k = u16::from_le_bytes(bytes[14..16].try_into().unwrap());
                Ok((
                    Header {
                        payload_len,
                        hint: Some(SizeHint {
                            codec_family,
                            units_64k,
                        }),
                    },
                    SIZED_HEADER_LEN,
                ))
            }
            _ => Err(MtError::DataError),
        }
    }
}

/// Returns `true` if `magic` is exactly this engine's envelope magic.
#[inline]
pub fn is_envelope_magic(magic: u32) -> bool {
    magic == ENVELOPE_MAGIC
}
