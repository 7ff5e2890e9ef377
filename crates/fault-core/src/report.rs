//! Fault report formatting.
//!
//! The report has two parts:
//!
//! 1. A baseline dump, always emitted: the eight stacked registers, the five
//!    fault status registers and EXC_RETURN, each as `0x%08X` after a label
//!    padded to twelve columns.
//! 2. A structured decode of the categories relevant to the vector that fired
//!    (see [`FaultVector::categories`]).
//!
//! ```text
//!
//! !!!Fault detected!!!
//!
//! Stack frame:
//! R0 :        0x00000000
//! ...
//! PSR:        0x21000000
//!
//! Fault status:
//! HFSR:       0x40000000
//! ...
//!
//! Other:
//! EXC_RETURN: 0xFFFFFFF9
//! MemManage fault status:
//!  - MMAR holds an invalid address.
//! ...
//! Usage fault status:
//!
//! Details of the fault status:
//! Hard fault status:
//!  - Forced Hard fault.
//! ```
//!
//! The `Details of the fault status:` heading only ever introduces the Hard
//! section, so it appears for the HardFault vector alone.

use core::fmt::Write as _;

use crate::decode::{decode, FaultCategory};
use crate::frame::{ExcReturn, ExceptionFrame};
use crate::sink::LineWriter;
use crate::status::FaultStatus;

/// Exception vector that delivered the fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultVector {
    /// MemManage (exception 4)
    MemManage,
    /// BusFault (exception 5)
    Bus,
    /// UsageFault (exception 6)
    Usage,
    /// HardFault (exception 3), also the escalation target for the others
    Hard,
}

impl FaultVector {
    /// Categories decoded when this vector fires, in report order.
    ///
    /// HardFault decodes everything: it is where MemManage, Bus and Usage
    /// faults land when their own handler is disabled or itself faults. The
    /// escalated sub-fields come first, HFSR last.
    pub const fn categories(self) -> &'static [FaultCategory] {
        match self {
            Self::MemManage => &[FaultCategory::MemManage],
            Self::Bus => &[FaultCategory::Bus],
            Self::Usage => &[FaultCategory::Usage],
            Self::Hard => &[
                FaultCategory::MemManage,
                FaultCategory::Bus,
                FaultCategory::Usage,
                FaultCategory::Hard,
            ],
        }
    }

    /// Architectural exception number.
    pub const fn exception_number(self) -> u8 {
        match self {
            Self::Hard => 3,
            Self::MemManage => 4,
            Self::Bus => 5,
            Self::Usage => 6,
        }
    }

    /// Inverse of [`exception_number`](Self::exception_number).
    pub const fn from_exception_number(n: u8) -> Option<Self> {
        match n {
            3 => Some(Self::Hard),
            4 => Some(Self::MemManage),
            5 => Some(Self::Bus),
            6 => Some(Self::Usage),
            _ => None,
        }
    }

    /// Short vector name used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hard => "HardFault",
            Self::MemManage => "MemManage",
            Self::Bus => "BusFault",
            Self::Usage => "UsageFault",
        }
    }
}

/// Everything captured for one fault: the input to the report, the hook and
/// the crash record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultContext {
    /// Vector that fired
    pub vector: FaultVector,
    /// Stacked registers
    pub frame: ExceptionFrame,
    /// LR at exception entry
    pub exc_return: ExcReturn,
    /// Status register snapshot
    pub status: FaultStatus,
}

/// Number of fields in the baseline dump.
pub const DUMP_FIELDS: usize = 14;

impl FaultContext {
    /// Label/value pairs of the baseline dump, in print order.
    pub const fn dump_fields(&self) -> [(&'static str, u32); DUMP_FIELDS] {
        let f = &self.frame;
        let s = &self.status;
        [
            ("R0 :", f.r0),
            ("R1 :", f.r1),
            ("R2 :", f.r2),
            ("R3 :", f.r3),
            ("R12:", f.r12),
            ("LR :", f.lr),
            ("PC :", f.pc),
            ("PSR:", f.psr),
            ("HFSR:", s.hfsr),
            ("CFSR:", s.cfsr),
            ("MMAR:", s.mmfar),
            ("BFAR:", s.bfar),
            ("AFSR:", s.afsr),
            ("EXC_RETURN:", self.exc_return.raw()),
        ]
    }
}

/// Section headings printed before dump fields 0, 8 and 13.
const SECTIONS: [(usize, &str); 3] = [(0, "Stack frame:"), (8, "Fault status:"), (13, "Other:")];

/// Printed, after a blank line, directly above the Hard section.
const HARD_DETAILS_HEADING: &str = "Details of the fault status:";

/// Write the full report for `ctx` to `sink`.
///
/// Never fails: sink errors are swallowed line by line.
pub fn write_report<W: embedded_io::Write>(sink: &mut W, ctx: &FaultContext) {
    let mut w = LineWriter::new(sink);

    let _ = w.write_str("\n!!!Fault detected!!!\n");

    for (index, (label, value)) in ctx.dump_fields().into_iter().enumerate() {
        if let Some((_, heading)) = SECTIONS.iter().find(|(at, _)| *at == index) {
            let _ = write!(w, "\n{heading}\n");
        }
        let _ = writeln!(w, "{label:<12}0x{value:08X}");
    }

    for &category in ctx.vector.categories() {
        if category == FaultCategory::Hard {
            let _ = write!(w, "\n{HARD_DETAILS_HEADING}\n");
        }
        let _ = writeln!(w, "{}", category.title());
        for line in decode(category, &ctx.status) {
            let _ = writeln!(w, " - {line}");
        }
    }

    w.finish();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mocks::MockSink;

    fn ctx(vector: FaultVector, hfsr: u32, cfsr: u32) -> FaultContext {
        FaultContext {
            vector,
            frame: ExceptionFrame::from_words([1, 2, 3, 4, 12, 0x0800_0101, 0x0800_0200, 0x2100_0000]),
            exc_return: ExcReturn::new(0xFFFF_FFF9),
            status: FaultStatus {
                hfsr,
                cfsr,
                mmfar: 0xE000_EDF8,
                bfar: 0x4000_0000,
                afsr: 0,
            },
        }
    }

    #[test]
    fn dump_lines_are_fixed_width() {
        let mut sink = MockSink::new();
        write_report(&mut sink, &ctx(FaultVector::Usage, 0, 0));
        let text = sink.text();
        assert!(text.contains("R0 :        0x00000001\n"));
        assert!(text.contains("R12:        0x0000000C\n"));
        assert!(text.contains("PC :        0x08000200\n"));
        assert!(text.contains("MMAR:       0xE000EDF8\n"));
        assert!(text.contains("EXC_RETURN: 0xFFFFFFF9\n"));
    }

    #[test]
    fn usage_vector_decodes_only_usage() {
        let mut sink = MockSink::new();
        write_report(&mut sink, &ctx(FaultVector::Usage, 1 << 30, (1 << 25) | (1 << 15) | (1 << 7)));
        let text = sink.text();
        assert!(text.contains("Usage fault status:\n - The processor has executed an SDIV"));
        assert!(!text.contains("Bus fault status:"));
        assert!(!text.contains("MemManage fault status:"));
        assert!(!text.contains("Hard fault status:"));
        assert!(!text.contains("Forced Hard fault."));
    }

    #[test]
    fn hard_vector_decodes_sub_fields_then_hfsr() {
        let mut sink = MockSink::new();
        write_report(&mut sink, &ctx(FaultVector::Hard, 1 << 30, 1 << 25));
        let text = sink.text();
        let decoded = text.split("EXC_RETURN: 0xFFFFFFF9\n").nth(1).unwrap();
        assert_eq!(
            decoded,
            "MemManage fault status:\n \
             - MMAR holds an invalid address.\n\
             Bus fault status:\n \
             - BFAR holds an invalid address.\n\
             Usage fault status:\n \
             - The processor has executed an SDIV or UDIV instruction with a divisor of 0.\n\
             \n\
             Details of the fault status:\n\
             Hard fault status:\n \
             - Forced Hard fault.\n"
        );
    }

    #[test]
    fn details_heading_only_for_hard_vector() {
        for vector in [FaultVector::MemManage, FaultVector::Bus, FaultVector::Usage] {
            let mut sink = MockSink::new();
            write_report(&mut sink, &ctx(vector, 1 << 30, u32::MAX));
            let text = sink.text();
            assert!(!text.contains("Details of the fault status:"), "{vector:?}");
            let title = vector.categories()[0].title();
            assert!(text.contains(&format!("EXC_RETURN: 0xFFFFFFF9\n{title}\n")), "{vector:?}");
        }
    }

    #[test]
    fn section_headings_precede_their_fields() {
        let mut sink = MockSink::new();
        write_report(&mut sink, &ctx(FaultVector::Bus, 0, 0));
        let text = sink.text();
        assert!(text.starts_with("\n!!!Fault detected!!!\n\nStack frame:\nR0 :"));
        assert!(text.contains("PSR:        0x21000000\n\nFault status:\nHFSR:"));
        assert!(text.contains("AFSR:       0x00000000\n\nOther:\nEXC_RETURN:"));
    }

    #[test]
    fn exception_numbers_round_trip() {
        for v in [FaultVector::Hard, FaultVector::MemManage, FaultVector::Bus, FaultVector::Usage] {
            assert_eq!(FaultVector::from_exception_number(v.exception_number()), Some(v));
        }
        assert_eq!(FaultVector::from_exception_number(2), None);
    }
}
