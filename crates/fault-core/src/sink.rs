//! Byte sinks for the fault report.
//!
//! The report goes to any [`embedded_io::Write`]. Delivery is best effort: the
//! reporter issues one `write` per line, never retries, and ignores both errors
//! and short writes. A broken transport therefore loses text but can never stop
//! the terminal policy from running.
//!
//! [`ItmSink`] is the default transport on parts with an ITM: bytes go to
//! stimulus port 0 and are picked up by SWO.

use core::convert::Infallible;

use crate::registers::{Register, RegisterFile, ITM_STIM_FIFOREADY, ITM_TCR_ITMENA};

/// Longest line the reporter formats in one piece.
pub const LINE_CAPACITY: usize = 160;

/// Formats one line at a time and hands each completed line to the sink with
/// a single `write` call.
pub(crate) struct LineWriter<'a, W: embedded_io::Write> {
    sink: &'a mut W,
    line: heapless::String<LINE_CAPACITY>,
}

impl<'a, W: embedded_io::Write> LineWriter<'a, W> {
    pub(crate) fn new(sink: &'a mut W) -> Self {
        Self {
            sink,
            line: heapless::String::new(),
        }
    }

    /// Emit whatever is buffered. Errors and short writes are dropped.
    pub(crate) fn flush_line(&mut self) {
        if !self.line.is_empty() {
            let _ = self.sink.write(self.line.as_bytes());
            self.line.clear();
        }
    }

    /// Flush the sink itself once the report is complete.
    pub(crate) fn finish(mut self) {
        self.flush_line();
        let _ = self.sink.flush();
    }
}

impl<W: embedded_io::Write> core::fmt::Write for LineWriter<'_, W> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for ch in s.chars() {
            if self.line.push(ch).is_err() {
                // over-long line: emit what fits and keep going
                self.flush_line();
                let _ = self.line.push(ch);
            }
            if ch == '\n' {
                self.flush_line();
            }
        }
        Ok(())
    }
}

/// Maximum FIFO-ready polls per byte before [`ItmSink`] drops it.
pub const ITM_READY_SPINS: u32 = 10_000;

/// ITM stimulus port 0 transport.
///
/// Each byte waits for the stimulus FIFO (bounded by [`ITM_READY_SPINS`]) and is
/// then written as an 8-bit stimulus. When the ITM or port 0 is disabled (no
/// SWO viewer configured) bytes are discarded without polling.
pub struct ItmSink<R: RegisterFile> {
    regs: R,
    dropped: u32,
}

impl<R: RegisterFile> ItmSink<R> {
    /// Wrap a register file.
    pub fn new(regs: R) -> Self {
        Self { regs, dropped: 0 }
    }

    /// `true` when TCR.ITMENA and TER0 bit 0 are both set.
    pub fn port_enabled(&self) -> bool {
        self.regs.read(Register::ItmTcr) & ITM_TCR_ITMENA != 0
            && self.regs.read(Register::ItmTer0) & 1 != 0
    }

    /// Bytes discarded since construction (saturating).
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Release the register file.
    pub fn into_inner(self) -> R {
        self.regs
    }

    fn put(&mut self, byte: u8) -> bool {
        for _ in 0..ITM_READY_SPINS {
            if self.regs.read(Register::ItmStim0) & ITM_STIM_FIFOREADY != 0 {
                self.regs.write(Register::ItmStim0, u32::from(byte));
                return true;
            }
        }
        false
    }
}

impl<R: RegisterFile> embedded_io::ErrorType for ItmSink<R> {
    type Error = Infallible;
}

impl<R: RegisterFile> embedded_io::Write for ItmSink<R> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if !self.port_enabled() {
            self.dropped = self
                .dropped
                .saturating_add(u32::try_from(buf.len()).unwrap_or(u32::MAX));
            return Ok(buf.len());
        }
        for &byte in buf {
            if !self.put(byte) {
                self.dropped = self.dropped.saturating_add(1);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
