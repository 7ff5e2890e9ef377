//! One-shot fault engine: snapshot, report, hook, terminal action.

use crate::config::FaultConfig;
use crate::frame::{ExcReturn, ExceptionFrame};
use crate::policy::{apply_policy, CpuControl};
use crate::registers::RegisterFile;
use crate::report::{write_report, FaultContext, FaultVector};
use crate::status::FaultStatus;

/// Owns everything the fault path touches.
///
/// Built once inside the exception handler and consumed by
/// [`handle`](Self::handle).
pub struct FaultEngine<R, C, W> {
    regs: R,
    cpu: C,
    sink: W,
    config: FaultConfig,
}

impl<R, C, W> FaultEngine<R, C, W>
where
    R: RegisterFile,
    C: CpuControl,
    W: embedded_io::Write,
{
    /// Assemble an engine.
    pub fn new(regs: R, cpu: C, sink: W, config: FaultConfig) -> Self {
        Self {
            regs,
            cpu,
            sink,
            config,
        }
    }

    /// Snapshot the status registers, then build the frame.
    ///
    /// `read_frame` runs only after every status register has been read: the
    /// stacked frame may sit in memory whose access faults again, and that
    /// second fault must not add its sticky bits to the snapshot.
    pub fn capture<F>(&self, vector: FaultVector, exc_return: ExcReturn, read_frame: F) -> FaultContext
    where
        F: FnOnce() -> ExceptionFrame,
    {
        let status = FaultStatus::snapshot(&self.regs);
        FaultContext {
            vector,
            frame: read_frame(),
            exc_return,
            status,
        }
    }

    /// Capture an already-read frame and emit the full report.
    pub fn report(&mut self, vector: FaultVector, frame: ExceptionFrame, exc_return: ExcReturn) -> FaultContext {
        let ctx = self.capture(vector, exc_return, || frame);
        self.emit(&ctx);
        ctx
    }

    fn emit(&mut self, ctx: &FaultContext) {
        #[cfg(feature = "defmt")]
        {
            defmt::error!(
                "{} at pc={=u32:#x} lr={=u32:#x} cfsr={=u32:#x} hfsr={=u32:#x}",
                ctx.vector.name(),
                ctx.frame.pc,
                ctx.frame.lr,
                ctx.status.cfsr,
                ctx.status.hfsr
            );
            let exc = ctx.exc_return;
            if exc.is_well_formed() {
                defmt::error!(
                    "entered from {=str} mode on {}, {=str} frame",
                    if exc.returns_to_thread() { "thread" } else { "handler" },
                    exc.stack(),
                    if exc.has_fp_frame() { "extended" } else { "basic" }
                );
            } else {
                defmt::warn!("EXC_RETURN {=u32:#x} is malformed, LR was clobbered before capture", exc.raw());
            }
        }

        write_report(&mut self.sink, ctx);
    }

    /// Report an already-read frame, run the hook, then take the terminal
    /// action. Never returns.
    pub fn handle(self, vector: FaultVector, frame: ExceptionFrame, exc_return: ExcReturn) -> ! {
        self.handle_with(vector, exc_return, || frame)
    }

    /// Like [`handle`](Self::handle), reading the frame through `read_frame`
    /// after the status snapshot (see [`capture`](Self::capture)).
    pub fn handle_with<F>(mut self, vector: FaultVector, exc_return: ExcReturn, read_frame: F) -> !
    where
        F: FnOnce() -> ExceptionFrame,
    {
        let ctx = self.capture(vector, exc_return, read_frame);
        self.emit(&ctx);
        if let Some(hook) = self.config.hook {
            hook(&ctx);
        }
        apply_policy(self.config.policy, &mut self.regs, &mut self.cpu)
    }
}
