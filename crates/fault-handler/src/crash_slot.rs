//! Retained crash record slot.
//!
//! A [`CrashSlot`] placed in a `.uninit` section survives a software reset.
//! The fault hook [`store`](CrashSlot::store)s the context, the next boot
//! [`take`](CrashSlot::take)s it back and invalidates the slot so each fault
//! is reported once.

use fault_core::{CrashRecord, CrashRecordError, FaultContext};

/// Raw storage for one [`CrashRecord`].
#[repr(C, align(4))]
pub struct CrashSlot {
    bytes: [u8; CrashRecord::SIZE],
}

impl CrashSlot {
    /// An empty slot.
    pub const fn empty() -> Self {
        Self {
            bytes: [0; CrashRecord::SIZE],
        }
    }

    /// Persist `ctx`, overwriting any previous record.
    pub fn store(&mut self, ctx: &FaultContext) {
        self.bytes = CrashRecord::new(*ctx).encode();
    }

    /// Decode the stored record and invalidate the slot.
    ///
    /// After power-on the slot holds whatever RAM powered up with, which
    /// decodes as [`CrashRecordError::BadMagic`] or
    /// [`CrashRecordError::ChecksumMismatch`].
    pub fn take(&mut self) -> Result<CrashRecord, CrashRecordError> {
        let record = CrashRecord::decode(&self.bytes);
        self.bytes = [0; CrashRecord::SIZE];
        record
    }

    /// `true` if the slot currently holds a decodable record.
    pub fn is_occupied(&self) -> bool {
        CrashRecord::decode(&self.bytes).is_ok()
    }
}

impl Default for CrashSlot {
    fn default() -> Self {
        Self::empty()
    }
}
