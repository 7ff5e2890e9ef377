//! Property-based tests for the status decode.
//! Verifies invariants hold for ALL register values, not just fixed examples.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use fault_core::{decode, descriptors, FaultCategory, FaultStatus, FaultVector, Meaning};

const CATEGORIES: [FaultCategory; 4] = [
    FaultCategory::Hard,
    FaultCategory::MemManage,
    FaultCategory::Bus,
    FaultCategory::Usage,
];

fn lines(category: FaultCategory, hfsr: u32, cfsr: u32) -> Vec<&'static str> {
    let status = FaultStatus {
        hfsr,
        cfsr,
        ..FaultStatus::default()
    };
    decode(category, &status).collect()
}

/// Bits a category describes, excluding validity bits.
fn flag_bits(category: FaultCategory) -> Vec<u8> {
    descriptors(category)
        .filter(|d| matches!(d.meaning, Meaning::WhenSet(_)))
        .map(|d| d.bit)
        .collect()
}

fn validity_lines(category: FaultCategory) -> usize {
    descriptors(category)
        .filter(|d| matches!(d.meaning, Meaning::Validity { .. }))
        .count()
}

proptest::proptest! {
    /// Same input, same lines, same order.
    #[test]
    fn decode_is_deterministic(hfsr in proptest::num::u32::ANY, cfsr in proptest::num::u32::ANY) {
        for category in CATEGORIES {
            assert_eq!(lines(category, hfsr, cfsr), lines(category, hfsr, cfsr));
        }
    }

    /// Line count is validity lines plus one per set flag bit.
    #[test]
    fn line_count_matches_set_flags(hfsr in proptest::num::u32::ANY, cfsr in proptest::num::u32::ANY) {
        for category in CATEGORIES {
            let value = if category == FaultCategory::Hard { hfsr } else { cfsr };
            let set = flag_bits(category)
                .into_iter()
                .filter(|&b| value & (1 << b) != 0)
                .count();
            assert_eq!(lines(category, hfsr, cfsr).len(), validity_lines(category) + set);
        }
    }

    /// CFSR categories never look at HFSR and vice versa.
    #[test]
    fn categories_read_only_their_register(hfsr in proptest::num::u32::ANY, cfsr in proptest::num::u32::ANY) {
        assert_eq!(lines(FaultCategory::Hard, hfsr, cfsr), lines(FaultCategory::Hard, hfsr, 0));
        for category in [FaultCategory::MemManage, FaultCategory::Bus, FaultCategory::Usage] {
            assert_eq!(lines(category, hfsr, cfsr), lines(category, 0, cfsr));
        }
    }

    /// Each sub-field only depends on its own byte range of CFSR.
    #[test]
    fn subfields_are_independent(cfsr in proptest::num::u32::ANY) {
        assert_eq!(lines(FaultCategory::MemManage, 0, cfsr), lines(FaultCategory::MemManage, 0, cfsr & 0xFF));
        assert_eq!(lines(FaultCategory::Bus, 0, cfsr), lines(FaultCategory::Bus, 0, cfsr & 0xFF00));
        assert_eq!(lines(FaultCategory::Usage, 0, cfsr), lines(FaultCategory::Usage, 0, cfsr & 0xFFFF_0000));
    }

    /// A single relevant bit yields exactly one line beyond the validity lines.
    #[test]
    fn single_bit_single_line(index in 0usize..19) {
        let all: Vec<(FaultCategory, u8)> = CATEGORIES
            .iter()
            .flat_map(|&c| flag_bits(c).into_iter().map(move |b| (c, b)))
            .collect();
        let (category, bit) = all[index % all.len()];
        let value = 1u32 << bit;
        let (hfsr, cfsr) = if category == FaultCategory::Hard { (value, 0) } else { (0, value) };
        assert_eq!(lines(category, hfsr, cfsr).len(), validity_lines(category) + 1);
    }

    /// The vector only selects categories; the lines for a category are the
    /// same whichever vector reports them.
    #[test]
    fn vector_selects_but_does_not_change_decode(cfsr in proptest::num::u32::ANY) {
        for vector in [FaultVector::MemManage, FaultVector::Bus, FaultVector::Usage] {
            for &category in vector.categories() {
                assert!(FaultVector::Hard.categories().contains(&category));
                assert_eq!(lines(category, 0, cfsr), lines(category, 1 << 30, cfsr));
            }
        }
    }
}

#[test]
fn nothing_set_gives_only_validity_lines() {
    for category in CATEGORIES {
        assert_eq!(lines(category, 0, 0).len(), validity_lines(category));
    }
}
