//! Fault handler demo - Main Entry Point
//!
//! Hardware-only entry point for STM32F411. Reports any crash record left by
//! the previous boot, arms the fault vectors, then executes an undefined
//! instruction. Watch ITM port 0 for the report and RTT for the defmt log.

#![no_std]
#![no_main]

use core::ptr::addr_of_mut;

use cortex_m_rt::entry;
use fault_core::{CrashRecordError, FaultContext, Traps};
use fault_handler::CrashSlot;

// Logging transport and panic handler
use defmt_rtt as _;
use panic_probe as _;

// Survives a software reset: cortex-m-rt never initializes `.uninit`
#[link_section = ".uninit.CRASH_SLOT"]
static mut CRASH_SLOT: CrashSlot = CrashSlot::empty();

fn persist(ctx: &FaultContext) {
    // SAFETY: runs once on the fault path with interrupts disabled; the only
    // other access is `report_previous_crash` before the hook is registered.
    unsafe { (*addr_of_mut!(CRASH_SLOT)).store(ctx) };
}

fn report_previous_crash() {
    // SAFETY: single-threaded start-up, the fault hook is not registered yet.
    let slot = unsafe { &mut *addr_of_mut!(CRASH_SLOT) };
    match slot.take() {
        Ok(record) => defmt::warn!(
            "Previous boot faulted: {} at pc={=u32:#x} lr={=u32:#x} cfsr={=u32:#x} hfsr={=u32:#x}",
            record.context.vector,
            record.context.frame.pc,
            record.context.frame.lr,
            record.context.status.cfsr,
            record.context.status.hfsr
        ),
        Err(CrashRecordError::BadMagic) => defmt::info!("No crash record from previous boot"),
        Err(e) => defmt::warn!("Discarded crash record: {}", e),
    }
}

#[entry]
fn main() -> ! {
    defmt::info!("Fault handler demo v{=str}", env!("CARGO_PKG_VERSION"));
    defmt::info!("Recovery policy: {=str}", fault_handler::POLICY.as_str());

    report_previous_crash();

    // SAFETY: start-up, nothing else has configured SHCSR or CCR.
    unsafe {
        fault_handler::install(Traps {
            divide_by_zero: true,
            unaligned: false,
        });
    }
    fault_handler::set_hook(persist);

    defmt::info!("Executing undefined instruction");
    // SAFETY: deliberately raises UNDEFINSTR; the fault path never returns.
    unsafe { core::arch::asm!("udf #0", options(noreturn)) }
}
