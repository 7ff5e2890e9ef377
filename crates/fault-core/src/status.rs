//! Fault status register snapshot.

use crate::registers::{Register, RegisterFile};

/// Identifies one of the five fault status registers in a [`FaultStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusRegister {
    /// HardFault Status Register
    Hfsr,
    /// Configurable Fault Status Register
    Cfsr,
    /// MemManage Fault Address Register
    Mmfar,
    /// BusFault Address Register
    Bfar,
    /// Auxiliary Fault Status Register
    Afsr,
}

impl StatusRegister {
    /// Registers in report order.
    pub const ALL: [Self; 5] = [Self::Hfsr, Self::Cfsr, Self::Mmfar, Self::Bfar, Self::Afsr];

    /// The register-file identifier for this status register.
    pub const fn register(self) -> Register {
        match self {
            Self::Hfsr => Register::Hfsr,
            Self::Cfsr => Register::Cfsr,
            Self::Mmfar => Register::Mmfar,
            Self::Bfar => Register::Bfar,
            Self::Afsr => Register::Afsr,
        }
    }
}

/// One read of each fault status register, taken before any decode.
///
/// MMFAR and BFAR are captured regardless of MMARVALID/BFARVALID; the report
/// prints them raw and leaves interpretation to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultStatus {
    /// HFSR
    pub hfsr: u32,
    /// CFSR
    pub cfsr: u32,
    /// MMFAR
    pub mmfar: u32,
    /// BFAR
    pub bfar: u32,
    /// AFSR
    pub afsr: u32,
}

impl FaultStatus {
    /// Read each status register exactly once.
    pub fn snapshot<R: RegisterFile + ?Sized>(regs: &R) -> Self {
        Self {
            hfsr: regs.read(Register::Hfsr),
            cfsr: regs.read(Register::Cfsr),
            mmfar: regs.read(Register::Mmfar),
            bfar: regs.read(Register::Bfar),
            afsr: regs.read(Register::Afsr),
        }
    }

    /// Value captured for `reg`.
    pub const fn get(&self, reg: StatusRegister) -> u32 {
        match reg {
            StatusRegister::Hfsr => self.hfsr,
            StatusRegister::Cfsr => self.cfsr,
            StatusRegister::Mmfar => self.mmfar,
            StatusRegister::Bfar => self.bfar,
            StatusRegister::Afsr => self.afsr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockRegisters;

    #[test]
    fn snapshot_reads_each_register_once() {
        let regs = MockRegisters::new()
            .with(Register::Hfsr, 0x4000_0000)
            .with(Register::Cfsr, 0x0000_8208)
            .with(Register::Mmfar, 0xE000_EDF8)
            .with(Register::Bfar, 0x2002_0000)
            .with(Register::Afsr, 0x0000_0001);

        let status = FaultStatus::snapshot(&regs);

        assert_eq!(status.hfsr, 0x4000_0000);
        assert_eq!(status.cfsr, 0x0000_8208);
        assert_eq!(status.mmfar, 0xE000_EDF8);
        assert_eq!(status.bfar, 0x2002_0000);
        assert_eq!(status.afsr, 0x0000_0001);
        for reg in StatusRegister::ALL {
            assert_eq!(regs.read_count(reg.register()), 1);
        }
    }

    #[test]
    fn get_matches_fields() {
        let status = FaultStatus {
            hfsr: 1,
            cfsr: 2,
            mmfar: 3,
            bfar: 4,
            afsr: 5,
        };
        let values: [u32; 5] = StatusRegister::ALL.map(|r| status.get(r));
        assert_eq!(values, [1, 2, 3, 4, 5]);
    }
}
