//! [`RegisterFile`] backed by the Cortex-M System Control Space.

use cortex_m::peripheral::{DCB, ITM, SCB};
use fault_core::{Register, RegisterFile};

/// Live SCB, DCB and ITM registers.
pub struct CortexMRegisters {
    _private: (),
}

impl CortexMRegisters {
    /// Access the system registers without taking `cortex_m::Peripherals`.
    ///
    /// # Safety
    ///
    /// Writes bypass any ownership the application holds over SCB and ITM.
    /// Only call this on the fault path, where normal execution has stopped,
    /// or during start-up before anything else touches SHCSR and CCR.
    pub unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl RegisterFile for CortexMRegisters {
    fn read(&self, reg: Register) -> u32 {
        // SAFETY: SCB::PTR, DCB::PTR and ITM::PTR are the architecturally fixed
        // System Control Space blocks, always mapped on ARMv7-M.
        let (scb, dcb, itm) = unsafe { (&*SCB::PTR, &*DCB::PTR, &*ITM::PTR) };
        match reg {
            Register::Hfsr => scb.hfsr.read(),
            Register::Cfsr => scb.cfsr.read(),
            Register::Mmfar => scb.mmfar.read(),
            Register::Bfar => scb.bfar.read(),
            Register::Afsr => scb.afsr.read(),
            Register::Aircr => scb.aircr.read(),
            Register::Shcsr => scb.shcsr.read(),
            Register::Ccr => scb.ccr.read(),
            Register::Dhcsr => dcb.dhcsr.read(),
            Register::ItmTer0 => itm.ter.first().map_or(0, |ter| ter.read()),
            Register::ItmTcr => itm.tcr.read(),
            // SAFETY: stimulus port 0 is word-aligned MMIO; a read returns FIFOREADY.
            Register::ItmStim0 => unsafe { (reg.address() as *const u32).read_volatile() },
        }
    }

    fn write(&mut self, reg: Register, value: u32) {
        // SAFETY: see `read`; `steal` restricts when writes may happen.
        let (scb, dcb, itm) = unsafe { (&*SCB::PTR, &*DCB::PTR, &*ITM::PTR) };
        // SAFETY: every target below is a writable System Control Space register.
        unsafe {
            match reg {
                Register::Hfsr => scb.hfsr.write(value),
                Register::Cfsr => scb.cfsr.write(value),
                Register::Mmfar => scb.mmfar.write(value),
                Register::Bfar => scb.bfar.write(value),
                Register::Afsr => scb.afsr.write(value),
                Register::Aircr => scb.aircr.write(value),
                Register::Shcsr => scb.shcsr.write(value),
                Register::Ccr => scb.ccr.write(value),
                Register::Dhcsr => dcb.dhcsr.write(value),
                Register::ItmTer0 => {
                    if let Some(ter) = itm.ter.first() {
                        ter.write(value);
                    }
                }
                Register::ItmTcr => itm.tcr.write(value),
                // 8-bit stimulus write: one byte per FIFO entry
                #[allow(clippy::cast_possible_truncation)]
                Register::ItmStim0 => (reg.address() as *mut u8).write_volatile(value as u8),
            }
        }
    }
}
