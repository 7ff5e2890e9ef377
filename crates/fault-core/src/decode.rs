//! Fault status bit-field decode tables.
//!
//! One static table describes every bit the report knows about. Each category
//! (Hard, MemManage, Bus, Usage) is a contiguous run of that table, listed in
//! the order lines are emitted: the validity entry first, then flags from the
//! highest bit down.
//!
//! Every entry is evaluated on its own. Several causes can be latched at once
//! (a stacking error alongside an imprecise bus error is common) and all of
//! them are reported.

use crate::registers::{self, bit_is_set};
use crate::status::{FaultStatus, StatusRegister};

/// Fault class a status bit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultCategory {
    /// HFSR bits
    Hard,
    /// CFSR bits 0-7
    MemManage,
    /// CFSR bits 8-15
    Bus,
    /// CFSR bits 16-31
    Usage,
}

impl FaultCategory {
    /// Header line printed above the category's decoded lines.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Hard => "Hard fault status:",
            Self::MemManage => "MemManage fault status:",
            Self::Bus => "Bus fault status:",
            Self::Usage => "Usage fault status:",
        }
    }
}

/// How a bit maps to report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meaning {
    /// Described only while the bit is set.
    WhenSet(&'static str),
    /// Always described: `valid` when set, `invalid` when clear.
    Validity {
        /// Message for a set bit
        valid: &'static str,
        /// Message for a clear bit
        invalid: &'static str,
    },
}

/// A single decodable status bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitFieldDescriptor {
    /// Register holding the bit
    pub register: StatusRegister,
    /// Bit position within the register
    pub bit: u8,
    /// Category the bit is reported under
    pub category: FaultCategory,
    /// Text mapping
    pub meaning: Meaning,
}

impl BitFieldDescriptor {
    const fn flag(
        register: StatusRegister,
        bit: u8,
        category: FaultCategory,
        message: &'static str,
    ) -> Self {
        Self {
            register,
            bit,
            category,
            meaning: Meaning::WhenSet(message),
        }
    }

    const fn validity(bit: u8, category: FaultCategory, valid: &'static str, invalid: &'static str) -> Self {
        Self {
            register: StatusRegister::Cfsr,
            bit,
            category,
            meaning: Meaning::Validity { valid, invalid },
        }
    }

    /// Message for this bit given the register value, or `None` if the bit is
    /// a flag that is not set.
    pub const fn describe(&self, value: u32) -> Option<&'static str> {
        let set = bit_is_set(value, self.bit);
        match self.meaning {
            Meaning::WhenSet(message) => {
                if set {
                    Some(message)
                } else {
                    None
                }
            }
            Meaning::Validity { valid, invalid } => {
                if set {
                    Some(valid)
                } else {
                    Some(invalid)
                }
            }
        }
    }
}

/// Lazy FP state preservation shares its wording between MemManage and Bus.
const LAZY_FP: &str = "Fault occurred during floating-point lazy state preservation.";

use FaultCategory::{Bus, Hard, MemManage, Usage};
use StatusRegister::{Cfsr, Hfsr};

/// Every described status bit, grouped by category in emission order.
pub static FAULT_BITS: [BitFieldDescriptor; 21] = [
    // ── HFSR ────────────────────────────────────────────────────────────────
    BitFieldDescriptor::flag(Hfsr, registers::HFSR_FORCED, Hard, "Forced Hard fault."),
    BitFieldDescriptor::flag(Hfsr, registers::HFSR_VECTTBL, Hard, "Bus fault on vector table read."),
    // ── MMFSR ───────────────────────────────────────────────────────────────
    BitFieldDescriptor::validity(
        registers::CFSR_MMARVALID,
        MemManage,
        "MMAR holds a valid address.",
        "MMAR holds an invalid address.",
    ),
    BitFieldDescriptor::flag(Cfsr, registers::CFSR_MLSPERR, MemManage, LAZY_FP),
    BitFieldDescriptor::flag(Cfsr, registers::CFSR_MSTKERR, MemManage, "Stacking has caused an access violation."),
    BitFieldDescriptor::flag(Cfsr, registers::CFSR_MUNSTKERR, MemManage, "Unstacking has caused an access violation."),
    BitFieldDescriptor::flag(
        Cfsr,
        registers::CFSR_DACCVIOL,
        MemManage,
        "Load or store at a location that does not permit the operation.",
    ),
    BitFieldDescriptor::flag(
        Cfsr,
        registers::CFSR_IACCVIOL,
        MemManage,
        "Instruction fetch from a location that does not permit execution.",
    ),
    // ── BFSR ────────────────────────────────────────────────────────────────
    BitFieldDescriptor::validity(
        registers::CFSR_BFARVALID,
        Bus,
        "BFAR holds a valid address.",
        "BFAR holds an invalid address.",
    ),
    BitFieldDescriptor::flag(Cfsr, registers::CFSR_LSPERR, Bus, LAZY_FP),
    BitFieldDescriptor::flag(Cfsr, registers::CFSR_STKERR, Bus, "Stacking has caused a Bus fault."),
    BitFieldDescriptor::flag(Cfsr, registers::CFSR_UNSTKERR, Bus, "Unstacking has caused a Bus fault."),
    BitFieldDescriptor::flag(
        Cfsr,
        registers::CFSR_IMPRECISERR,
        Bus,
        "Data bus error has occurred, but the return address in the stack is not related to the fault.",
    ),
    BitFieldDescriptor::flag(
        Cfsr,
        registers::CFSR_PRECISERR,
        Bus,
        "Data bus error has occurred, and the return address points to the instruction that caused the fault.",
    ),
    BitFieldDescriptor::flag(Cfsr, registers::CFSR_IBUSERR, Bus, "Instruction bus error."),
    // ── UFSR ────────────────────────────────────────────────────────────────
    BitFieldDescriptor::flag(
        Cfsr,
        registers::CFSR_DIVBYZERO,
        Usage,
        "The processor has executed an SDIV or UDIV instruction with a divisor of 0.",
    ),
    BitFieldDescriptor::flag(
        Cfsr,
        registers::CFSR_UNALIGNED,
        Usage,
        "The processor has made an unaligned memory access.",
    ),
    BitFieldDescriptor::flag(Cfsr, registers::CFSR_NOCP, Usage, "Attempted to access a coprocessor."),
    BitFieldDescriptor::flag(Cfsr, registers::CFSR_INVPC, Usage, "Illegal attempt to load of EXC_RETURN to the PC."),
    BitFieldDescriptor::flag(
        Cfsr,
        registers::CFSR_INVSTATE,
        Usage,
        "Attempted to execute an instruction that makes illegal use of the EPSR.",
    ),
    BitFieldDescriptor::flag(
        Cfsr,
        registers::CFSR_UNDEFINSTR,
        Usage,
        "The processor has attempted to execute an undefined instruction.",
    ),
];

/// Descriptors belonging to `category`, in emission order.
pub fn descriptors(category: FaultCategory) -> impl Iterator<Item = &'static BitFieldDescriptor> {
    FAULT_BITS.iter().filter(move |d| d.category == category)
}

/// Decoded lines for `category` given a status snapshot.
///
/// Pure function of the relevant register value: the same bits always produce
/// the same lines in the same order.
pub fn decode(category: FaultCategory, status: &FaultStatus) -> impl Iterator<Item = &'static str> + '_ {
    descriptors(category).filter_map(move |d| d.describe(status.get(d.register)))
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use super::FaultCategory::{Bus, Hard, MemManage, Usage};
    use crate::status::StatusRegister::{Cfsr, Hfsr};

    fn lines(category: FaultCategory, hfsr: u32, cfsr: u32) -> heapless::Vec<&'static str, 16> {
        let status = FaultStatus {
            hfsr,
            cfsr,
            ..FaultStatus::default()
        };
        decode(category, &status).collect()
    }

    #[test]
    fn bus_example_decodes_three_lines_in_order() {
        // IBUSERR (8) + STKERR (12), BFARVALID (15) clear
        let out = lines(Bus, 0, 0x0000_1100);
        assert_eq!(
            out.as_slice(),
            &[
                "BFAR holds an invalid address.",
                "Stacking has caused a Bus fault.",
                "Instruction bus error.",
            ]
        );
    }

    #[test]
    fn forced_hard_fault_only() {
        let out = lines(Hard, 1 << 30, 0);
        assert_eq!(out.as_slice(), &["Forced Hard fault."]);
    }

    #[test]
    fn vecttbl_and_forced_both_reported() {
        let out = lines(Hard, (1 << 30) | (1 << 1), 0);
        assert_eq!(out.as_slice(), &["Forced Hard fault.", "Bus fault on vector table read."]);
    }

    #[test]
    fn validity_lines_are_never_silent() {
        assert_eq!(lines(MemManage, 0, 0).as_slice(), &["MMAR holds an invalid address."]);
        assert_eq!(lines(Bus, 0, 0).as_slice(), &["BFAR holds an invalid address."]);
        assert!(lines(Usage, 0, 0).is_empty());
        assert!(lines(Hard, 0, 0).is_empty());
    }

    #[test]
    fn valid_address_bits_report_valid() {
        let out = lines(MemManage, 0, (1 << 7) | (1 << 1));
        assert_eq!(
            out.as_slice(),
            &[
                "MMAR holds a valid address.",
                "Load or store at a location that does not permit the operation.",
            ]
        );
        let out = lines(Bus, 0, (1 << 15) | (1 << 9));
        assert_eq!(out[0], "BFAR holds a valid address.");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn divbyzero_alone_gives_one_usage_line() {
        let out = lines(Usage, 0, 1 << 25);
        assert_eq!(
            out.as_slice(),
            &["The processor has executed an SDIV or UDIV instruction with a divisor of 0."]
        );
    }

    #[test]
    fn reserved_bits_are_not_described() {
        // bits 2, 6, 14, 20-23, 26-31 of CFSR are reserved
        let reserved: u32 = (1 << 2) | (1 << 6) | (1 << 14) | 0x00F0_0000 | 0xFC00_0000;
        assert_eq!(lines(MemManage, 0, reserved).len(), 1);
        assert_eq!(lines(Bus, 0, reserved).len(), 1);
        assert!(lines(Usage, 0, reserved).is_empty());
    }

    #[test]
    fn table_uses_architectural_bit_positions() {
        let bits = |c| descriptors(c).map(|d| d.bit).collect::<heapless::Vec<u8, 8>>();
        assert_eq!(bits(Hard).as_slice(), &[30, 1]);
        assert_eq!(bits(MemManage).as_slice(), &[7, 5, 4, 3, 1, 0]);
        assert_eq!(bits(Bus).as_slice(), &[15, 13, 12, 11, 10, 9, 8]);
        assert_eq!(bits(Usage).as_slice(), &[25, 24, 19, 18, 17, 16]);
    }

    #[test]
    fn hard_category_reads_hfsr_others_read_cfsr() {
        for d in &FAULT_BITS {
            let expected = if d.category == Hard { Hfsr } else { Cfsr };
            assert_eq!(d.register, expected);
        }
    }
}
