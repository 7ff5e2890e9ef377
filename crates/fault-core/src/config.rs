//! Fault engine configuration.
//!
//! Policy selection is a value rather than a build variant: deployments
//! declare one `static` [`FaultConfig`] and hand it to the engine.
//!
//! ```
//! use fault_core::{FaultConfig, FaultContext, RecoveryPolicy};
//!
//! fn persist(_ctx: &FaultContext) {
//!     // write a crash flag to retained RAM
//! }
//!
//! static CONFIG: FaultConfig = FaultConfig::new(RecoveryPolicy::Reboot).with_hook(persist);
//! assert!(CONFIG.hook.is_some());
//! ```

use crate::policy::RecoveryPolicy;
use crate::report::FaultContext;

/// Callback run after the report is emitted and before the terminal action.
///
/// Runs in fault context: it must not rely on interrupts, the allocator or any
/// state the faulted code may have been holding.
pub type FaultHook = fn(&FaultContext);

/// Policy plus optional hook.
#[derive(Debug, Clone, Copy)]
pub struct FaultConfig {
    /// Terminal action selection
    pub policy: RecoveryPolicy,
    /// Application callback, if any
    pub hook: Option<FaultHook>,
}

impl FaultConfig {
    /// Config with `policy` and no hook.
    pub const fn new(policy: RecoveryPolicy) -> Self {
        Self { policy, hook: None }
    }

    /// Same config with `hook` installed.
    #[must_use]
    pub const fn with_hook(self, hook: FaultHook) -> Self {
        Self {
            policy: self.policy,
            hook: Some(hook),
        }
    }

    /// Same config with `hook` replacing whatever was installed.
    #[must_use]
    pub const fn with_optional_hook(self, hook: Option<FaultHook>) -> Self {
        Self {
            policy: self.policy,
            hook,
        }
    }
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self::new(RecoveryPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &FaultContext) {}

    #[test]
    fn default_is_breakpoint_without_hook() {
        let cfg = FaultConfig::default();
        assert_eq!(cfg.policy, RecoveryPolicy::Breakpoint);
        assert!(cfg.hook.is_none());
    }

    #[test]
    fn const_construction_with_hook() {
        const CFG: FaultConfig = FaultConfig::new(RecoveryPolicy::Halt).with_hook(noop);
        assert_eq!(CFG.policy, RecoveryPolicy::Halt);
        assert!(CFG.hook.is_some());
        assert!(CFG.with_optional_hook(None).hook.is_none());
    }
}
