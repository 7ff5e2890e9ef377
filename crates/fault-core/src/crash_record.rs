//! Fixed-layout crash record.
//!
//! A fault hook can persist one of these to retained RAM or flash so the next
//! boot can tell what happened even when nobody was watching the report.

use thiserror_no_std::Error;

use crate::frame::{ExcReturn, ExceptionFrame, FRAME_WORDS};
use crate::report::{FaultContext, FaultVector};
use crate::status::FaultStatus;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Error variants for crash record decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrashRecordError {
    /// Bytes `[0..4]` are not `b"FLT1"` (slot empty or never written)
    #[error("bad crash record magic")]
    BadMagic,
    /// Version byte not recognised by this implementation
    #[error("unsupported crash record version {0}")]
    UnsupportedVersion(u8),
    /// Vector byte is not an exception number 3..=6
    #[error("unknown fault vector {0}")]
    UnknownVector(u8),
    /// Stored CRC32 does not match the payload
    #[error("crash record checksum mismatch")]
    ChecksumMismatch,
}

// ---------------------------------------------------------------------------
// CrashRecord: 68-byte fixed record
// ---------------------------------------------------------------------------

/// Serialised [`FaultContext`].
///
/// All multi-byte integers are little-endian.
///
/// Layout (68 bytes total):
/// ```text
/// [0..4]   magic       b"FLT1"
/// [4]      version     u8 = 1
/// [5]      vector      u8  (exception number 3..=6)
/// [6..8]   _pad        [u8; 2]
/// [8..12]  exc_return  u32 le
/// [12..44] frame       [u32 le; 8]  R0 R1 R2 R3 R12 LR PC PSR
/// [44..64] status      [u32 le; 5]  HFSR CFSR MMFAR BFAR AFSR
/// [64..68] crc32       u32 le  (CRC32 of bytes [0..64])
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CrashRecord {
    /// Captured fault
    pub context: FaultContext,
}

impl CrashRecord {
    /// Encoded size in bytes
    pub const SIZE: usize = 68;
    /// Leading magic
    pub const MAGIC: &'static [u8; 4] = b"FLT1";
    /// Layout version written by [`encode`](Self::encode)
    pub const VERSION: u8 = 1;

    const PAYLOAD: usize = 64;
    const FRAME_AT: usize = 12;
    const STATUS_AT: usize = 44;

    /// Wrap a captured context.
    pub const fn new(context: FaultContext) -> Self {
        Self { context }
    }

    /// Encode into a 68-byte buffer.
    ///
    /// # Safety (lint allow)
    /// All range indices are compile-time constants within `[0, SIZE)`.
    #[must_use]
    #[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let ctx = &self.context;
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(Self::MAGIC);
        buf[4] = Self::VERSION;
        buf[5] = ctx.vector.exception_number();
        buf[8..12].copy_from_slice(&ctx.exc_return.raw().to_le_bytes());

        for (i, word) in ctx.frame.to_words().iter().enumerate() {
            let at = Self::FRAME_AT + i * 4;
            buf[at..at + 4].copy_from_slice(&word.to_le_bytes());
        }
        let s = &ctx.status;
        for (i, word) in [s.hfsr, s.cfsr, s.mmfar, s.bfar, s.afsr].iter().enumerate() {
            let at = Self::STATUS_AT + i * 4;
            buf[at..at + 4].copy_from_slice(&word.to_le_bytes());
        }

        let crc = crc32fast::hash(&buf[..Self::PAYLOAD]);
        buf[Self::PAYLOAD..].copy_from_slice(&crc.to_le_bytes());
        buf
    }

    /// Decode a record.
    ///
    /// # Errors
    ///
    /// Returns [`CrashRecordError::BadMagic`] if bytes `[0..4]` are not `b"FLT1"`.
    /// Returns [`CrashRecordError::UnsupportedVersion`] if byte `[4]` is not
    /// [`CrashRecord::VERSION`].
    /// Returns [`CrashRecordError::ChecksumMismatch`] if the stored CRC32 does
    /// not cover the payload.
    /// Returns [`CrashRecordError::UnknownVector`] if byte `[5]` is not a fault
    /// exception number.
    pub fn decode(buf: &[u8; Self::SIZE]) -> Result<Self, CrashRecordError> {
        if buf.get(0..4) != Some(Self::MAGIC.as_ref()) {
            return Err(CrashRecordError::BadMagic);
        }
        let version = buf.get(4).copied().unwrap_or_default();
        if version != Self::VERSION {
            return Err(CrashRecordError::UnsupportedVersion(version));
        }
        let payload = buf.get(..Self::PAYLOAD).unwrap_or_default();
        if crc32fast::hash(payload) != word_at(buf, Self::PAYLOAD) {
            return Err(CrashRecordError::ChecksumMismatch);
        }
        let vector_byte = buf.get(5).copied().unwrap_or_default();
        let vector = FaultVector::from_exception_number(vector_byte)
            .ok_or(CrashRecordError::UnknownVector(vector_byte))?;

        let mut words = [0u32; FRAME_WORDS];
        let mut at = Self::FRAME_AT;
        for word in &mut words {
            *word = word_at(buf, at);
            at = at.saturating_add(4);
        }
        let status_word = |n: usize| word_at(buf, Self::STATUS_AT.saturating_add(n.saturating_mul(4)));

        Ok(Self {
            context: FaultContext {
                vector,
                frame: ExceptionFrame::from_words(words),
                exc_return: ExcReturn::new(word_at(buf, 8)),
                status: FaultStatus {
                    hfsr: status_word(0),
                    cfsr: status_word(1),
                    mmfar: status_word(2),
                    bfar: status_word(3),
                    afsr: status_word(4),
                },
            },
        })
    }
}

impl From<FaultContext> for CrashRecord {
    fn from(context: FaultContext) -> Self {
        Self::new(context)
    }
}

/// Little-endian word at `at`, or zero past the end of `buf`.
fn word_at(buf: &[u8], at: usize) -> u32 {
    buf.get(at..at.saturating_add(4))
        .and_then(|b| <[u8; 4]>::try_from(b).ok())
        .map_or(0, u32::from_le_bytes)
}
