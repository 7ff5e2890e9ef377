//! Cortex-M fault vectors wired to the [`fault_core`] engine
//!
//! Linking this crate with the `hardware` feature installs `HardFault` (and,
//! per feature, `MemoryManagement`, `BusFault`, `UsageFault`). A fault then
//! runs one pass of:
//!
//! ```text
//! entry asm (MSP/PSP select)
//!         ↓
//! FaultEngine: snapshot → report to ITM port 0 → hook → policy
//! ```
//!
//! # Features
//!
//! - `hardware` - Cortex-M target (cortex-m, cortex-m-rt, defmt)
//! - `memmanage`, `busfault`, `usagefault` - Dedicated entry per fault class
//! - `policy-halt`, `policy-reboot`, `policy-breakpoint-else-reboot` -
//!   Terminal action (default: breakpoint if a debugger is attached, else halt)
//!
//! # Usage
//!
//! ```ignore
//! use fault_handler::{install, set_hook};
//! use fault_core::Traps;
//!
//! fn persist(ctx: &fault_core::FaultContext) { /* write crash record */ }
//!
//! // during start-up
//! unsafe { install(Traps { divide_by_zero: true, unaligned: false }) };
//! set_hook(persist);
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod crash_slot;
pub mod hook;

#[cfg(feature = "hardware")]
pub mod cpu;
#[cfg(feature = "hardware")]
pub mod registers;

#[cfg(all(feature = "hardware", target_arch = "arm"))]
mod entry;

pub use config::{configure, current, POLICY, WIRED};
pub use crash_slot::CrashSlot;
pub use hook::{clear_hook, current_hook, set_hook};

use fault_core::{CpuControl, ExcReturn, ExceptionFrame, FaultEngine, FaultVector, RegisterFile};

/// Run the engine for one fault with the build's policy and the registered
/// hook. Never returns.
///
/// `read_frame` runs after the status registers are snapshotted. The vector
/// entries call this with the live registers; tests call it with mocks.
pub fn handle_fault<R, C, W, F>(
    vector: FaultVector,
    exc_return: ExcReturn,
    read_frame: F,
    regs: R,
    cpu: C,
    sink: W,
) -> !
where
    R: RegisterFile,
    C: CpuControl,
    W: embedded_io::Write,
    F: FnOnce() -> ExceptionFrame,
{
    FaultEngine::new(regs, cpu, sink, config::current()).handle_with(vector, exc_return, read_frame)
}

/// Enable the wired fault vectors and `traps` on the running core.
///
/// # Safety
///
/// Performs read-modify-write on SHCSR and CCR. Call once during start-up,
/// before anything else configures those registers.
#[cfg(feature = "hardware")]
pub unsafe fn install(traps: fault_core::Traps) {
    // SAFETY: forwarded to the caller.
    let mut regs = unsafe { registers::CortexMRegisters::steal() };
    configure(&mut regs, traps);
}
