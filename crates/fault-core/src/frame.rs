//! Exception frame capture
//!
//! On exception entry the core pushes eight words onto whichever stack was
//! active and loads LR with an EXC_RETURN value describing that stack:
//!
//! ```text
//! SP + 0x00  R0
//! SP + 0x04  R1
//! SP + 0x08  R2
//! SP + 0x0C  R3
//! SP + 0x10  R12
//! SP + 0x14  LR   (of the faulted context)
//! SP + 0x18  PC   (return address)
//! SP + 0x1C  xPSR
//! ```
//!
//! Choosing the wrong stack silently reports garbage PC/LR/PSR values, so the
//! selection rule lives here as a pure function that both the assembly shim and
//! the tests agree on.

/// Number of words the core stacks on exception entry (basic frame).
pub const FRAME_WORDS: usize = 8;

/// The stack pointer that was in use when the exception was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackPointer {
    /// Main stack pointer (handler mode, or thread mode without a process stack)
    Main,
    /// Process stack pointer (thread mode with CONTROL.SPSEL = 1)
    Process,
}

impl StackPointer {
    /// Select the stack from EXC_RETURN bit 2 (0 ⇒ MSP, 1 ⇒ PSP).
    pub const fn from_exc_return(exc_return: u32) -> Self {
        if exc_return & ExcReturn::SPSEL != 0 {
            Self::Process
        } else {
            Self::Main
        }
    }
}

/// Raw EXC_RETURN value with field accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct ExcReturn(u32);

impl ExcReturn {
    /// Bit 2: return stack (0 = MSP, 1 = PSP)
    pub const SPSEL: u32 = 1 << 2;
    /// Bit 3: return mode (0 = handler, 1 = thread)
    pub const MODE: u32 = 1 << 3;
    /// Bit 4: frame type (0 = extended frame with FP state, 1 = basic frame)
    pub const FTYPE: u32 = 1 << 4;
    /// EXC_RETURN values always carry 0xFFFFFF in bits 31:8 on ARMv7-M.
    pub const PREFIX_MASK: u32 = 0xFFFF_FF00;

    /// Wrap a raw LR value captured at exception entry.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw 32-bit value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Stack the hardware frame was pushed to.
    pub const fn stack(self) -> StackPointer {
        StackPointer::from_exc_return(self.0)
    }

    /// `true` when the faulted context was running in thread mode.
    pub const fn returns_to_thread(self) -> bool {
        self.0 & Self::MODE != 0
    }

    /// `true` when the frame is the extended (FP) variant.
    pub const fn has_fp_frame(self) -> bool {
        self.0 & Self::FTYPE == 0
    }

    /// `true` when bits 31:8 hold the architectural 0xFFFFFF prefix.
    ///
    /// A value failing this check means LR was clobbered before capture.
    pub const fn is_well_formed(self) -> bool {
        self.0 & Self::PREFIX_MASK == Self::PREFIX_MASK
    }
}

impl From<u32> for ExcReturn {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// The eight registers stacked by hardware on exception entry.
///
/// Field order matches the in-memory layout, so a pointer to the stacked frame
/// can be read as `[u32; 8]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct ExceptionFrame {
    /// R0
    pub r0: u32,
    /// R1
    pub r1: u32,
    /// R2
    pub r2: u32,
    /// R3
    pub r3: u32,
    /// R12
    pub r12: u32,
    /// Link register of the faulted context
    pub lr: u32,
    /// Return address (faulting or next instruction)
    pub pc: u32,
    /// Program status register
    pub psr: u32,
}

impl ExceptionFrame {
    /// Build a frame from words in stacking order.
    pub const fn from_words(words: [u32; FRAME_WORDS]) -> Self {
        let [r0, r1, r2, r3, r12, lr, pc, psr] = words;
        Self {
            r0,
            r1,
            r2,
            r3,
            r12,
            lr,
            pc,
            psr,
        }
    }

    /// Words in stacking order.
    pub const fn to_words(&self) -> [u32; FRAME_WORDS] {
        [
            self.r0, self.r1, self.r2, self.r3, self.r12, self.lr, self.pc, self.psr,
        ]
    }

    /// Read a stacked frame from memory.
    ///
    /// Each word is read with a volatile load so the compiler cannot elide or
    /// reorder accesses to a stack that may already be corrupt.
    ///
    /// # Safety
    ///
    /// `sp` must be word-aligned and point at [`FRAME_WORDS`] readable words,
    /// i.e. the value of MSP or PSP selected by [`StackPointer::from_exc_return`]
    /// at exception entry.
    pub unsafe fn read_from(sp: *const u32) -> Self {
        let mut words = [0u32; FRAME_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            // SAFETY: caller guarantees FRAME_WORDS readable, aligned words at `sp`;
            // i < FRAME_WORDS keeps every offset in range.
            *word = unsafe { sp.add(i).read_volatile() };
        }
        Self::from_words(words)
    }
}
