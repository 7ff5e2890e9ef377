//! Boot-time fault configuration.
//!
//! Out of reset only HardFault is enabled: MemManage, BusFault and UsageFault
//! escalate to it, and divide-by-zero and unaligned accesses do not trap at
//! all. These helpers turn on the dedicated vectors and the optional traps so
//! the report can name the precise cause.

use crate::registers::{
    Register, RegisterFile, CCR_DIV_0_TRP, CCR_UNALIGN_TRP, SHCSR_BUSFAULTENA, SHCSR_MEMFAULTENA,
    SHCSR_USGFAULTENA,
};

/// Which configurable fault vectors to enable in SHCSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultVectors {
    /// MemManage (MEMFAULTENA)
    pub memmanage: bool,
    /// BusFault (BUSFAULTENA)
    pub bus: bool,
    /// UsageFault (USGFAULTENA)
    pub usage: bool,
}

impl FaultVectors {
    /// All three configurable vectors.
    pub const ALL: Self = Self {
        memmanage: true,
        bus: true,
        usage: true,
    };

    const fn shcsr_bits(self) -> u32 {
        let mut bits = 0;
        if self.memmanage {
            bits |= SHCSR_MEMFAULTENA;
        }
        if self.bus {
            bits |= SHCSR_BUSFAULTENA;
        }
        if self.usage {
            bits |= SHCSR_USGFAULTENA;
        }
        bits
    }
}

/// Optional UsageFault traps in CCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Traps {
    /// Trap SDIV/UDIV by zero (DIV_0_TRP)
    pub divide_by_zero: bool,
    /// Trap unaligned word/halfword accesses (UNALIGN_TRP)
    pub unaligned: bool,
}

/// Set the SHCSR enable bits for `vectors`, leaving every other bit as read.
///
/// Never clears an enable bit that is already set.
pub fn enable_fault_exceptions<R: RegisterFile + ?Sized>(regs: &mut R, vectors: FaultVectors) {
    let bits = vectors.shcsr_bits();
    if bits == 0 {
        return;
    }
    let current = regs.read(Register::Shcsr);
    regs.write(Register::Shcsr, current | bits);
}

/// Set the CCR trap bits for `traps`, leaving every other bit as read.
pub fn enable_trap_on<R: RegisterFile + ?Sized>(regs: &mut R, traps: Traps) {
    let mut bits = 0;
    if traps.divide_by_zero {
        bits |= CCR_DIV_0_TRP;
    }
    if traps.unaligned {
        bits |= CCR_UNALIGN_TRP;
    }
    if bits == 0 {
        return;
    }
    let current = regs.read(Register::Ccr);
    regs.write(Register::Ccr, current | bits);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockRegisters;

    #[test]
    fn enables_only_requested_vectors() {
        let mut regs = MockRegisters::new().with(Register::Shcsr, 0x0000_0400);
        enable_fault_exceptions(
            &mut regs,
            FaultVectors {
                bus: true,
                usage: true,
                ..FaultVectors::default()
            },
        );
        assert_eq!(regs.writes(), &[(Register::Shcsr, 0x0006_0400)]);
    }

    #[test]
    fn all_vectors_sets_three_bits() {
        let mut regs = MockRegisters::new();
        enable_fault_exceptions(&mut regs, FaultVectors::ALL);
        assert_eq!(regs.peek(Register::Shcsr), 0x0007_0000);
    }

    #[test]
    fn nothing_requested_writes_nothing() {
        let mut regs = MockRegisters::new();
        enable_fault_exceptions(&mut regs, FaultVectors::default());
        enable_trap_on(&mut regs, Traps::default());
        assert!(regs.writes().is_empty());
    }

    #[test]
    fn traps_preserve_other_ccr_bits() {
        // STKALIGN (bit 9) set out of reset on most parts
        let mut regs = MockRegisters::new().with(Register::Ccr, 0x0000_0200);
        enable_trap_on(
            &mut regs,
            Traps {
                divide_by_zero: true,
                unaligned: false,
            },
        );
        assert_eq!(regs.peek(Register::Ccr), 0x0000_0210);
        enable_trap_on(
            &mut regs,
            Traps {
                divide_by_zero: false,
                unaligned: true,
            },
        );
        assert_eq!(regs.peek(Register::Ccr), 0x0000_0218);
    }
}
