//! Portable Cortex-M fault diagnosis and recovery engine
//!
//! Everything here operates on already-captured values and on a
//! [`RegisterFile`], so it runs unchanged on the target and on the host.
//!
//! # Fault path
//!
//! ```text
//! exception entry (fault-handler asm shim)
//!         ↓  frame reader + EXC_RETURN
//! FaultEngine::handle_with
//!         ├─ FaultStatus::snapshot   HFSR CFSR MMFAR BFAR AFSR, one read each
//!         ├─ frame read              only after the snapshot
//!         ├─ baseline dump           14 fixed-width hex fields
//!         └─ structured decode       categories selected by the vector
//!         ↓
//! FaultConfig::hook (optional)
//!         ↓
//! apply_policy                       breakpoint / reboot / halt, never returns
//! ```
//!
//! # Features
//!
//! - `std`: Expose [`mocks`] outside this crate's own tests
//! - `defmt`: Enable defmt derives and fault-path log lines
//!
//! # Example
//!
//! ```
//! use fault_core::{write_report, ExcReturn, ExceptionFrame, FaultContext, FaultStatus, FaultVector};
//!
//! struct Uart(Vec<u8>);
//!
//! impl embedded_io::ErrorType for Uart {
//!     type Error = core::convert::Infallible;
//! }
//!
//! impl embedded_io::Write for Uart {
//!     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
//!         self.0.extend_from_slice(buf);
//!         Ok(buf.len())
//!     }
//!     fn flush(&mut self) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! let ctx = FaultContext {
//!     vector: FaultVector::Hard,
//!     frame: ExceptionFrame::default(),
//!     exc_return: ExcReturn::new(0xFFFF_FFF9),
//!     status: FaultStatus { hfsr: 1 << 30, ..FaultStatus::default() },
//! };
//! let mut uart = Uart(Vec::new());
//! write_report(&mut uart, &ctx);
//! assert!(String::from_utf8_lossy(&uart.0).contains(" - Forced Hard fault.\n"));
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
// Pedantic lints suppressed for this register-level crate:
#![allow(clippy::doc_markdown)] // register names and hex addresses in doc comments
#![allow(clippy::must_use_candidate)] // register accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod crash_record;
pub mod decode;
pub mod engine;
pub mod frame;
pub mod mocks;
pub mod policy;
pub mod registers;
pub mod report;
pub mod setup;
pub mod sink;
pub mod status;

// Re-export the fault path
pub use config::{FaultConfig, FaultHook};
pub use engine::FaultEngine;
pub use frame::{ExcReturn, ExceptionFrame, StackPointer, FRAME_WORDS};
pub use report::{write_report, FaultContext, FaultVector};
pub use status::{FaultStatus, StatusRegister};

// Re-export decode tables
pub use decode::{decode, descriptors, BitFieldDescriptor, FaultCategory, Meaning, FAULT_BITS};

// Re-export policy types
pub use policy::{
    apply_policy, debugger_attached, select_action, CpuControl, PolicyParseError, RecoveryPolicy,
    TerminalAction,
};

// Re-export register access and setup
pub use registers::{Register, RegisterFile};
pub use setup::{enable_fault_exceptions, enable_trap_on, FaultVectors, Traps};

// Re-export sinks and persistence
pub use crash_record::{CrashRecord, CrashRecordError};
pub use sink::ItmSink;
