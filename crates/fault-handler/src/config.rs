//! Build-time fault configuration derived from cargo features.

use fault_core::{
    enable_fault_exceptions, enable_trap_on, FaultConfig, FaultVectors, RecoveryPolicy,
    RegisterFile, Traps,
};

use crate::hook;

/// Policy selected by the `policy-*` features.
pub const POLICY: RecoveryPolicy = RecoveryPolicy::from_features(
    cfg!(feature = "policy-halt"),
    cfg!(feature = "policy-reboot"),
    cfg!(feature = "policy-breakpoint-else-reboot"),
);

/// Configurable vectors with a dedicated entry in this build.
pub const WIRED: FaultVectors = FaultVectors {
    memmanage: cfg!(feature = "memmanage"),
    bus: cfg!(feature = "busfault"),
    usage: cfg!(feature = "usagefault"),
};

/// Policy plus whatever hook is registered right now.
pub fn current() -> FaultConfig {
    FaultConfig::new(POLICY).with_optional_hook(hook::current_hook())
}

/// Enable the wired vectors and the requested traps.
///
/// Call once during start-up. Unwired vectors stay disabled so their faults
/// escalate to HardFault, the one entry that is always present.
pub fn configure<R: RegisterFile + ?Sized>(regs: &mut R, traps: Traps) {
    enable_fault_exceptions(regs, WIRED);
    enable_trap_on(regs, traps);
}
