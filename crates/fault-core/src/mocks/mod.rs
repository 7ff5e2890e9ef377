//! Mock implementations for testing
//!
//! Host-side stand-ins for the register file, the byte sink and the CPU
//! control surface, for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]

use core::cell::RefCell;
use std::collections::HashMap;
use std::string::String;
use std::vec::Vec;

use crate::policy::CpuControl;
use crate::registers::{Register, RegisterFile};

// ---------------------------------------------------------------------------
// Registers
// ---------------------------------------------------------------------------

/// Mock register file
///
/// Reads return the last value preset with [`with`](Self::with) or written,
/// otherwise zero. Writes to [`Register::ItmStim0`] are logged but do not
/// change what it reads back, since on hardware that read returns FIFO status.
#[derive(Debug, Default)]
pub struct MockRegisters {
    values: HashMap<Register, u32>,
    reads: RefCell<HashMap<Register, u32>>,
    writes: Vec<(Register, u32)>,
}

impl MockRegisters {
    /// Create a register file where every register reads zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a register value
    #[must_use]
    pub fn with(mut self, reg: Register, value: u32) -> Self {
        self.values.insert(reg, value);
        self
    }

    /// Number of reads of `reg` so far
    pub fn read_count(&self, reg: Register) -> u32 {
        self.reads.borrow().get(&reg).copied().unwrap_or(0)
    }

    /// Every write, in order
    pub fn writes(&self) -> &[(Register, u32)] {
        &self.writes
    }

    /// Current value of `reg` without counting a read
    pub fn peek(&self, reg: Register) -> u32 {
        self.values.get(&reg).copied().unwrap_or(0)
    }
}

impl RegisterFile for MockRegisters {
    fn read(&self, reg: Register) -> u32 {
        let mut reads = self.reads.borrow_mut();
        let count = reads.entry(reg).or_insert(0);
        *count = count.saturating_add(1);
        self.peek(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        self.writes.push((reg, value));
        if reg != Register::ItmStim0 {
            self.values.insert(reg, value);
        }
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Error returned by a failing [`MockSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkUnavailable;

impl embedded_io::Error for SinkUnavailable {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::NotConnected
    }
}

/// Mock byte sink that records every `write` call
#[derive(Debug, Default)]
pub struct MockSink {
    bytes: Vec<u8>,
    write_calls: usize,
    failing: bool,
}

impl MockSink {
    /// Sink that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose every write fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Number of `write` calls, failed ones included
    pub fn write_calls(&self) -> usize {
        self.write_calls
    }

    /// Accepted bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Accepted bytes as text (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl embedded_io::ErrorType for MockSink {
    type Error = SinkUnavailable;
}

impl embedded_io::Write for MockSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.write_calls = self.write_calls.saturating_add(1);
        if self.failing {
            return Err(SinkUnavailable);
        }
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.failing {
            Err(SinkUnavailable)
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// CPU
// ---------------------------------------------------------------------------

/// Something the mock CPU was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuEvent {
    /// `bkpt`
    Breakpoint,
    /// `dsb` + `isb`
    Barrier,
}

/// Panic payload raised by [`MockCpu`] once its idle budget is spent.
///
/// Terminal paths never return, so tests run them under
/// `std::panic::catch_unwind` and expect this payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetExhausted {
    /// Idle iterations performed
    pub idles: u32,
}

/// Mock CPU control with a bounded idle loop
#[derive(Debug)]
pub struct MockCpu {
    events: Vec<CpuEvent>,
    idles: u32,
    budget: u32,
}

impl MockCpu {
    /// Default number of idle iterations before the mock gives up
    pub const DEFAULT_BUDGET: u32 = 1_000;

    /// CPU with [`DEFAULT_BUDGET`](Self::DEFAULT_BUDGET)
    pub fn new() -> Self {
        Self::with_budget(Self::DEFAULT_BUDGET)
    }

    /// CPU that panics with [`BudgetExhausted`] after `budget` idles
    pub fn with_budget(budget: u32) -> Self {
        Self {
            events: Vec::new(),
            idles: 0,
            budget,
        }
    }

    /// Breakpoints and barriers, in order
    pub fn events(&self) -> &[CpuEvent] {
        &self.events
    }

    /// Idle iterations so far
    pub fn idles(&self) -> u32 {
        self.idles
    }
}

impl Default for MockCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuControl for MockCpu {
    fn breakpoint(&mut self) {
        self.events.push(CpuEvent::Breakpoint);
    }

    fn barrier(&mut self) {
        self.events.push(CpuEvent::Barrier);
    }

    fn idle(&mut self) {
        self.idles = self.idles.saturating_add(1);
        if self.idles >= self.budget {
            std::panic::panic_any(BudgetExhausted { idles: self.idles });
        }
    }
}

/// Run a terminal operation under `catch_unwind` and return the
/// [`BudgetExhausted`] it ended with.
///
/// Returns `None` if the operation panicked with any other payload.
pub fn run_until_budget<F>(f: F) -> Option<BudgetExhausted>
where
    F: FnOnce(),
{
    let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).err()?;
    payload.downcast_ref::<BudgetExhausted>().copied()
}
