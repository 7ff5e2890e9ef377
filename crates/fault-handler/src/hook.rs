//! Runtime fault hook registry.
//!
//! The application registers at most one hook during start-up. The fault path
//! reads it once inside a critical section and passes it to the engine with the
//! compile-time policy.

use core::cell::Cell;

use critical_section::Mutex;
use fault_core::FaultHook;

static HOOK: Mutex<Cell<Option<FaultHook>>> = Mutex::new(Cell::new(None));

/// Register `hook`, returning the one it replaces.
pub fn set_hook(hook: FaultHook) -> Option<FaultHook> {
    critical_section::with(|cs| HOOK.borrow(cs).replace(Some(hook)))
}

/// Remove the registered hook, returning it.
pub fn clear_hook() -> Option<FaultHook> {
    critical_section::with(|cs| HOOK.borrow(cs).take())
}

/// Currently registered hook.
pub fn current_hook() -> Option<FaultHook> {
    critical_section::with(|cs| HOOK.borrow(cs).get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fault_core::FaultContext;

    fn first(_: &FaultContext) {}
    fn second(_: &FaultContext) {}

    // Single test: the registry is process-global.
    #[test]
    fn set_replace_and_clear() {
        assert!(set_hook(first).is_none());
        assert!(current_hook().is_some());
        let replaced = set_hook(second);
        assert!(replaced.is_some());
        assert!(clear_hook().is_some());
        assert!(current_hook().is_none());
        assert!(clear_hook().is_none());
    }
}
