//! Fault vector entry points.
//!
//! Each entry is a few instructions of assembly that run before any Rust code
//! can touch the stack:
//!
//! ```text
//! tst   lr, #4        EXC_RETURN bit 2: which stack holds the frame
//! ite   eq
//! mrseq r0, msp       0 => main stack
//! mrsne r0, psp       1 => process stack
//! mov   r1, lr        EXC_RETURN as second argument
//! b     on_<vector>   extern "C" fn(*const u32, u32) -> !
//! ```
//!
//! The symbols override cortex-m-rt's weak defaults, so the application must
//! not also define them with `#[exception]`. `HardFault` is always present;
//! `MemoryManagement`, `BusFault` and `UsageFault` are emitted only for the
//! matching `memmanage`, `busfault` and `usagefault` features.

use fault_core::{ExcReturn, ExceptionFrame, FaultVector, ItmSink};

use crate::cpu::CortexM;
use crate::registers::CortexMRegisters;

macro_rules! fault_entry {
    ($symbol:literal, $dispatch:path) => {
        core::arch::global_asm!(
            concat!(".section .text.", $symbol, ",\"ax\",%progbits"),
            concat!(".global ", $symbol),
            concat!(".type ", $symbol, ",%function"),
            ".thumb_func",
            concat!($symbol, ":"),
            "tst lr, #4",
            "ite eq",
            "mrseq r0, msp",
            "mrsne r0, psp",
            "mov r1, lr",
            "b {dispatch}",
            dispatch = sym $dispatch,
        );
    };
}

fault_entry!("HardFault", on_hard_fault);
#[cfg(feature = "memmanage")]
fault_entry!("MemoryManagement", on_memmanage);
#[cfg(feature = "busfault")]
fault_entry!("BusFault", on_bus_fault);
#[cfg(feature = "usagefault")]
fault_entry!("UsageFault", on_usage_fault);

unsafe extern "C" fn on_hard_fault(sp: *const u32, exc_return: u32) -> ! {
    // SAFETY: `sp` is the stack selected by EXC_RETURN bit 2 at entry.
    unsafe { dispatch(FaultVector::Hard, sp, exc_return) }
}

#[cfg(feature = "memmanage")]
unsafe extern "C" fn on_memmanage(sp: *const u32, exc_return: u32) -> ! {
    // SAFETY: `sp` is the stack selected by EXC_RETURN bit 2 at entry.
    unsafe { dispatch(FaultVector::MemManage, sp, exc_return) }
}

#[cfg(feature = "busfault")]
unsafe extern "C" fn on_bus_fault(sp: *const u32, exc_return: u32) -> ! {
    // SAFETY: `sp` is the stack selected by EXC_RETURN bit 2 at entry.
    unsafe { dispatch(FaultVector::Bus, sp, exc_return) }
}

#[cfg(feature = "usagefault")]
unsafe extern "C" fn on_usage_fault(sp: *const u32, exc_return: u32) -> ! {
    // SAFETY: `sp` is the stack selected by EXC_RETURN bit 2 at entry.
    unsafe { dispatch(FaultVector::Usage, sp, exc_return) }
}

/// Run the engine with the live registers.
///
/// The stacked frame is read only after the status snapshot: after a stacking
/// error `sp` may point at memory whose access faults again.
///
/// # Safety
///
/// `sp` must be the stack pointer selected by EXC_RETURN bit 2 at entry.
unsafe fn dispatch(vector: FaultVector, sp: *const u32, exc_return: u32) -> ! {
    cortex_m::interrupt::disable();

    // SAFETY: fault path; normal execution has stopped.
    let (regs, itm) = unsafe { (CortexMRegisters::steal(), CortexMRegisters::steal()) };

    crate::handle_fault(
        vector,
        ExcReturn::new(exc_return),
        // SAFETY: guaranteed by the caller.
        || unsafe { ExceptionFrame::read_from(sp) },
        regs,
        CortexM,
        ItmSink::new(itm),
    )
}
