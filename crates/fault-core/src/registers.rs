//! ARMv7-M System Control Space register map
//!
//! Source: ARMv7-M Architecture Reference Manual (DDI0403E), §B3.2 System
//! Control Block and §C1.6 Debug register support, and the Cortex-M4/M7
//! Technical Reference Manuals for the ITM.
//!
//! # Access model
//!
//! Every register the fault path touches is reached through [`RegisterFile`],
//! never through a raw pointer in portable code. The hardware implementation
//! lives in the `fault-handler` crate; host tests use
//! [`crate::mocks::MockRegisters`].
//!
//! # Sticky status bits
//!
//! CFSR and HFSR bits are write-one-to-clear and stay set until software clears
//! them. This crate never writes either register, so a snapshot taken at any
//! point during the report still reflects the fault that triggered it.

// ---------------------------------------------------------------------------
// Register identifiers
// ---------------------------------------------------------------------------

/// A memory-mapped 32-bit register used by the fault path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// HardFault Status Register
    Hfsr,
    /// Configurable Fault Status Register (MMFSR | BFSR << 8 | UFSR << 16)
    Cfsr,
    /// MemManage Fault Address Register
    Mmfar,
    /// BusFault Address Register
    Bfar,
    /// Auxiliary Fault Status Register (implementation defined)
    Afsr,
    /// Debug Halting Control and Status Register
    Dhcsr,
    /// Application Interrupt and Reset Control Register
    Aircr,
    /// System Handler Control and State Register
    Shcsr,
    /// Configuration and Control Register
    Ccr,
    /// ITM stimulus port 0. Reads return the FIFO-ready flag in bit 0.
    ItmStim0,
    /// ITM Trace Enable Register 0 (ports 0–31)
    ItmTer0,
    /// ITM Trace Control Register
    ItmTcr,
}

impl Register {
    /// Architectural address of the register.
    pub const fn address(self) -> usize {
        match self {
            Self::Hfsr => 0xE000_ED2C,
            Self::Cfsr => 0xE000_ED28,
            Self::Mmfar => 0xE000_ED34,
            Self::Bfar => 0xE000_ED38,
            Self::Afsr => 0xE000_ED3C,
            Self::Dhcsr => 0xE000_EDF0,
            Self::Aircr => 0xE000_ED0C,
            Self::Shcsr => 0xE000_ED24,
            Self::Ccr => 0xE000_ED14,
            Self::ItmStim0 => 0xE000_0000,
            Self::ItmTer0 => 0xE000_0E00,
            Self::ItmTcr => 0xE000_0E80,
        }
    }
}

/// Named 32-bit register access.
///
/// Implementations must perform exactly one bus access per call: the fault
/// snapshot relies on a single read per register.
pub trait RegisterFile {
    /// Read the current value of `reg`.
    fn read(&self, reg: Register) -> u32;

    /// Write `value` to `reg`.
    fn write(&mut self, reg: Register, value: u32);
}

impl<T: RegisterFile + ?Sized> RegisterFile for &mut T {
    fn read(&self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value);
    }
}

// ---------------------------------------------------------------------------
// HFSR bit positions
// ---------------------------------------------------------------------------

/// HFSR: vector table read fault
pub const HFSR_VECTTBL: u8 = 1;
/// HFSR: escalated (forced) HardFault
pub const HFSR_FORCED: u8 = 30;

// ---------------------------------------------------------------------------
// CFSR bit positions: MemManage (MMFSR, bits 0-7)
// ---------------------------------------------------------------------------

/// MMFSR: instruction access violation
pub const CFSR_IACCVIOL: u8 = 0;
/// MMFSR: data access violation
pub const CFSR_DACCVIOL: u8 = 1;
/// MMFSR: MemManage fault on exception return unstacking
pub const CFSR_MUNSTKERR: u8 = 3;
/// MMFSR: MemManage fault on exception entry stacking
pub const CFSR_MSTKERR: u8 = 4;
/// MMFSR: MemManage fault during lazy FP state preservation (FPU parts only)
pub const CFSR_MLSPERR: u8 = 5;
/// MMFSR: MMFAR holds a valid fault address
pub const CFSR_MMARVALID: u8 = 7;

// ---------------------------------------------------------------------------
// CFSR bit positions: BusFault (BFSR, bits 8-15)
// ---------------------------------------------------------------------------

/// BFSR: instruction bus error
pub const CFSR_IBUSERR: u8 = 8;
/// BFSR: precise data bus error
pub const CFSR_PRECISERR: u8 = 9;
/// BFSR: imprecise data bus error
pub const CFSR_IMPRECISERR: u8 = 10;
/// BFSR: BusFault on exception return unstacking
pub const CFSR_UNSTKERR: u8 = 11;
/// BFSR: BusFault on exception entry stacking
pub const CFSR_STKERR: u8 = 12;
/// BFSR: BusFault during lazy FP state preservation (FPU parts only)
pub const CFSR_LSPERR: u8 = 13;
/// BFSR: BFAR holds a valid fault address
pub const CFSR_BFARVALID: u8 = 15;

// ---------------------------------------------------------------------------
// CFSR bit positions: UsageFault (UFSR, bits 16-31)
// ---------------------------------------------------------------------------

/// UFSR: undefined instruction
pub const CFSR_UNDEFINSTR: u8 = 16;
/// UFSR: invalid EPSR state (e.g. BX to an even address)
pub const CFSR_INVSTATE: u8 = 17;
/// UFSR: invalid EXC_RETURN loaded into PC
pub const CFSR_INVPC: u8 = 18;
/// UFSR: coprocessor access while disabled or absent
pub const CFSR_NOCP: u8 = 19;
/// UFSR: unaligned access (requires CCR.UNALIGN_TRP)
pub const CFSR_UNALIGNED: u8 = 24;
/// UFSR: divide by zero (requires CCR.DIV_0_TRP)
pub const CFSR_DIVBYZERO: u8 = 25;

// ---------------------------------------------------------------------------
// Control register fields
// ---------------------------------------------------------------------------

/// DHCSR: C_DEBUGEN, set while a debugger has halting debug enabled
pub const DHCSR_C_DEBUGEN: u32 = 1 << 0;

/// AIRCR: write key, must accompany every write
pub const AIRCR_VECTKEY: u32 = 0x05FA << 16;
/// AIRCR: PRIGROUP field, preserved across a reset request
pub const AIRCR_PRIGROUP_MASK: u32 = 0b111 << 8;
/// AIRCR: SYSRESETREQ
pub const AIRCR_SYSRESETREQ: u32 = 1 << 2;

/// SHCSR: MemManage exception enable
pub const SHCSR_MEMFAULTENA: u32 = 1 << 16;
/// SHCSR: BusFault exception enable
pub const SHCSR_BUSFAULTENA: u32 = 1 << 17;
/// SHCSR: UsageFault exception enable
pub const SHCSR_USGFAULTENA: u32 = 1 << 18;

/// CCR: trap unaligned halfword and word accesses
pub const CCR_UNALIGN_TRP: u32 = 1 << 3;
/// CCR: trap SDIV/UDIV with a zero divisor
pub const CCR_DIV_0_TRP: u32 = 1 << 4;

/// ITM TCR: global ITM enable
pub const ITM_TCR_ITMENA: u32 = 1 << 0;
/// ITM stimulus port read: FIFO can accept a write
pub const ITM_STIM_FIFOREADY: u32 = 1 << 0;

/// Compute the AIRCR value that requests a system reset.
///
/// The PRIGROUP field of `current` is carried over; every other writable field
/// is cleared.
pub const fn reset_request(current: u32) -> u32 {
    AIRCR_VECTKEY | (current & AIRCR_PRIGROUP_MASK) | AIRCR_SYSRESETREQ
}

/// Returns `true` if bit `pos` of `value` is set.
#[inline]
pub const fn bit_is_set(value: u32, pos: u8) -> bool {
    value & 1u32.wrapping_shl(pos as u32) != 0
}
