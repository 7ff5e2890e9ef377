//! Terminal recovery policy.
//!
//! Runs after the report is fully emitted. Every path ends in an idle loop
//! that never hands control back to the faulted context:
//!
//! ```text
//!                     ┌─ debugger ──► Breakpoint ─┐
//! Breakpoint ─────────┤                           │
//!                     └─ none ──────► Halt ───────┤
//!                     ┌─ debugger ──► Breakpoint ─┤
//! BreakpointElseReboot┤                           ├──► idle forever
//!                     └─ none ──────► Reboot ─────┤
//! Reboot ───────────────────────────► Reboot ─────┤
//! Halt ─────────────────────────────► Halt ───────┘
//! ```

use core::str::FromStr;

use thiserror_no_std::Error;

use crate::registers::{reset_request, Register, RegisterFile, DHCSR_C_DEBUGEN};

/// Statically configured reaction to a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecoveryPolicy {
    /// Spin forever, leaving the core inspectable or for a watchdog to reset.
    Halt,
    /// Request a system reset through AIRCR.
    Reboot,
    /// Stop on a software breakpoint if a debugger is attached, otherwise halt.
    #[default]
    Breakpoint,
    /// Stop on a software breakpoint if a debugger is attached, otherwise reboot.
    BreakpointElseReboot,
}

impl RecoveryPolicy {
    /// Policy selected by a set of feature flags.
    ///
    /// Precedence when several are set: `reboot`, then
    /// `breakpoint_else_reboot`, then `halt`. None set yields
    /// [`RecoveryPolicy::Breakpoint`].
    pub const fn from_features(halt: bool, reboot: bool, breakpoint_else_reboot: bool) -> Self {
        if reboot {
            Self::Reboot
        } else if breakpoint_else_reboot {
            Self::BreakpointElseReboot
        } else if halt {
            Self::Halt
        } else {
            Self::Breakpoint
        }
    }

    /// Canonical lower-case name, accepted back by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Halt => "halt",
            Self::Reboot => "reboot",
            Self::Breakpoint => "breakpoint",
            Self::BreakpointElseReboot => "breakpoint-else-reboot",
        }
    }
}

/// Returned when a policy name is not recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("unknown recovery policy (expected halt, reboot, breakpoint or breakpoint-else-reboot)")]
pub struct PolicyParseError;

impl FromStr for RecoveryPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [
            Self::Halt,
            Self::Reboot,
            Self::Breakpoint,
            Self::BreakpointElseReboot,
        ]
        .into_iter()
        .find(|p| p.as_str().eq_ignore_ascii_case(s))
        .ok_or(PolicyParseError)
    }
}

/// The single action taken for one fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TerminalAction {
    /// Software breakpoint, then idle
    Breakpoint,
    /// AIRCR reset request, then idle until it lands
    Reboot,
    /// Idle
    Halt,
}

/// Resolve `policy` against debugger presence.
pub const fn select_action(policy: RecoveryPolicy, debugger_attached: bool) -> TerminalAction {
    match (policy, debugger_attached) {
        (RecoveryPolicy::Halt, _) | (RecoveryPolicy::Breakpoint, false) => TerminalAction::Halt,
        (RecoveryPolicy::Reboot, _) | (RecoveryPolicy::BreakpointElseReboot, false) => {
            TerminalAction::Reboot
        }
        (RecoveryPolicy::Breakpoint | RecoveryPolicy::BreakpointElseReboot, true) => {
            TerminalAction::Breakpoint
        }
    }
}

/// `true` when DHCSR.C_DEBUGEN is set.
pub fn debugger_attached<R: RegisterFile + ?Sized>(regs: &R) -> bool {
    regs.read(Register::Dhcsr) & DHCSR_C_DEBUGEN != 0
}

/// Processor operations the terminal paths need.
pub trait CpuControl {
    /// Execute a software breakpoint (`bkpt`).
    fn breakpoint(&mut self);

    /// Complete outstanding memory accesses (`dsb` + `isb`).
    fn barrier(&mut self);

    /// One iteration of the terminal loop (`wfe` or `nop`).
    fn idle(&mut self);
}

impl<T: CpuControl + ?Sized> CpuControl for &mut T {
    fn breakpoint(&mut self) {
        (**self).breakpoint();
    }

    fn barrier(&mut self) {
        (**self).barrier();
    }

    fn idle(&mut self) {
        (**self).idle();
    }
}

/// Write the AIRCR reset request, bracketed by barriers.
pub fn request_reset<R, C>(regs: &mut R, cpu: &mut C)
where
    R: RegisterFile + ?Sized,
    C: CpuControl + ?Sized,
{
    cpu.barrier();
    let current = regs.read(Register::Aircr);
    regs.write(Register::Aircr, reset_request(current));
    cpu.barrier();
}

/// Take the terminal action for `policy`. Never returns.
pub fn apply_policy<R, C>(policy: RecoveryPolicy, regs: &mut R, cpu: &mut C) -> !
where
    R: RegisterFile + ?Sized,
    C: CpuControl + ?Sized,
{
    let action = select_action(policy, debugger_attached(regs));

    #[cfg(feature = "defmt")]
    defmt::warn!("fault policy {}: {}", policy, action);

    match action {
        TerminalAction::Breakpoint => cpu.breakpoint(),
        TerminalAction::Reboot => request_reset(regs, cpu),
        TerminalAction::Halt => {}
    }

    loop {
        cpu.idle();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mocks::{run_until_budget, CpuEvent, MockCpu, MockRegisters};

    #[test]
    fn select_action_truth_table() {
        use RecoveryPolicy as P;
        use TerminalAction as A;
        let cases = [
            (P::Halt, false, A::Halt),
            (P::Halt, true, A::Halt),
            (P::Reboot, false, A::Reboot),
            (P::Reboot, true, A::Reboot),
            (P::Breakpoint, false, A::Halt),
            (P::Breakpoint, true, A::Breakpoint),
            (P::BreakpointElseReboot, false, A::Reboot),
            (P::BreakpointElseReboot, true, A::Breakpoint),
        ];
        for (policy, attached, expected) in cases {
            assert_eq!(select_action(policy, attached), expected, "{policy:?} attached={attached}");
        }
    }

    #[test]
    fn parse_policy_names() {
        assert_eq!("halt".parse::<RecoveryPolicy>(), Ok(RecoveryPolicy::Halt));
        assert_eq!(" Reboot ".parse::<RecoveryPolicy>(), Ok(RecoveryPolicy::Reboot));
        assert_eq!("BREAKPOINT".parse::<RecoveryPolicy>(), Ok(RecoveryPolicy::Breakpoint));
        assert_eq!(
            "breakpoint-else-reboot".parse::<RecoveryPolicy>(),
            Ok(RecoveryPolicy::BreakpointElseReboot)
        );
        assert_eq!("continue".parse::<RecoveryPolicy>(), Err(PolicyParseError));
        assert_eq!("".parse::<RecoveryPolicy>(), Err(PolicyParseError));
    }

    #[test]
    fn from_features_precedence() {
        assert_eq!(RecoveryPolicy::from_features(false, false, false), RecoveryPolicy::Breakpoint);
        assert_eq!(RecoveryPolicy::from_features(true, false, false), RecoveryPolicy::Halt);
        assert_eq!(RecoveryPolicy::from_features(true, true, true), RecoveryPolicy::Reboot);
        assert_eq!(
            RecoveryPolicy::from_features(true, false, true),
            RecoveryPolicy::BreakpointElseReboot
        );
    }

    #[test]
    fn breakpoint_without_debugger_idles_forever() {
        let mut regs = MockRegisters::new();
        let mut cpu = MockCpu::with_budget(500);
        let out = run_until_budget(|| apply_policy(RecoveryPolicy::Breakpoint, &mut regs, &mut cpu));
        assert_eq!(out.unwrap().idles, 500);
        assert!(cpu.events().is_empty());
        assert!(regs.writes().is_empty());
    }

    #[test]
    fn breakpoint_with_debugger_executes_bkpt_first() {
        let mut regs = MockRegisters::new().with(Register::Dhcsr, 0x0003_0003);
        let mut cpu = MockCpu::with_budget(10);
        assert!(run_until_budget(|| apply_policy(RecoveryPolicy::Breakpoint, &mut regs, &mut cpu)).is_some());
        assert_eq!(cpu.events(), &[CpuEvent::Breakpoint]);
    }

    #[test]
    fn reboot_writes_reset_request_between_barriers() {
        let mut regs = MockRegisters::new().with(Register::Aircr, 0xFA05_0300);
        let mut cpu = MockCpu::with_budget(10);
        assert!(run_until_budget(|| apply_policy(RecoveryPolicy::Reboot, &mut regs, &mut cpu)).is_some());
        assert_eq!(regs.writes(), &[(Register::Aircr, 0x05FA_0304)]);
        assert_eq!(cpu.events(), &[CpuEvent::Barrier, CpuEvent::Barrier]);
    }

    #[test]
    fn breakpoint_else_reboot_resets_when_unattended() {
        let mut regs = MockRegisters::new();
        let mut cpu = MockCpu::with_budget(10);
        assert!(
            run_until_budget(|| apply_policy(RecoveryPolicy::BreakpointElseReboot, &mut regs, &mut cpu))
                .is_some()
        );
        assert_eq!(regs.writes(), &[(Register::Aircr, 0x05FA_0004)]);
        assert!(!cpu.events().contains(&CpuEvent::Breakpoint));
    }

    #[test]
    fn halt_touches_nothing() {
        let mut regs = MockRegisters::new().with(Register::Dhcsr, 1);
        let mut cpu = MockCpu::with_budget(50);
        let out = run_until_budget(|| apply_policy(RecoveryPolicy::Halt, &mut regs, &mut cpu));
        assert_eq!(out.unwrap().idles, 50);
        assert_eq!(cpu.idles(), 50);
        assert!(cpu.events().is_empty());
        assert!(regs.writes().is_empty());
    }
}
