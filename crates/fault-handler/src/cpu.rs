//! [`CpuControl`] for a real Cortex-M core.

use cortex_m::asm;
use fault_core::CpuControl;

/// The executing core.
pub struct CortexM;

impl CpuControl for CortexM {
    fn breakpoint(&mut self) {
        asm::bkpt();
    }

    fn barrier(&mut self) {
        asm::dsb();
        asm::isb();
    }

    fn idle(&mut self) {
        asm::wfe();
    }
}
