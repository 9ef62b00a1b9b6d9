//! Lexical symbol tables.

use inkwell::values::PointerValue;
use rustc_hash::FxHashMap;

/// One active table of name → stack slot, plus a stack of saved tables.
///
/// Two save modes: [`save_copy`](ScopeStack::save_copy) for constructs that
/// inherit the surrounding bindings (`for`, scope blocks) and
/// [`save_fresh`](ScopeStack::save_fresh) for function bodies, which must
/// not see the caller's locals. Every save must be paired with a
/// [`restore`](ScopeStack::restore) on all exit paths, including lowering
/// failure.
#[derive(Debug, Default)]
pub(crate) struct ScopeStack<'ctx> {
    active: FxHashMap<String, PointerValue<'ctx>>,
    saved: Vec<FxHashMap<String, PointerValue<'ctx>>>,
}

impl<'ctx> ScopeStack<'ctx> {
    pub(crate) fn new() -> Self {
        ScopeStack::default()
    }

    /// Push the current table and keep a copy as the new active table.
    pub(crate) fn save_copy(&mut self) {
        self.saved.push(self.active.clone());
    }

    /// Push the current table and start from an empty one.
    pub(crate) fn save_fresh(&mut self) {
        self.saved.push(std::mem::take(&mut self.active));
    }

    /// Pop the most recently saved table and make it active again.
    pub(crate) fn restore(&mut self) {
        debug_assert!(!self.saved.is_empty(), "restore without a matching save");
        if let Some(previous) = self.saved.pop() {
            self.active = previous;
        }
    }

    /// Bind (or replace) a name in the active table.
    pub(crate) fn bind(&mut self, name: String, slot: PointerValue<'ctx>) {
        self.active.insert(name, slot);
    }

    /// Slot of a name currently in scope.
    pub(crate) fn lookup(&self, name: &str) -> Option<PointerValue<'ctx>> {
        self.active.get(name).copied()
    }

    /// Depth of the saved-table stack.
    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.saved.len()
    }
}

#[cfg(test)]
mod tests {
    use inkwell::context::Context;
    use inkwell::AddressSpace;

    use super::ScopeStack;

    #[test]
    fn copy_save_inherits_and_restore_unwinds() {
        let llcx = Context::create();
        let module = llcx.create_module("scope_test");
        let slot_a = module
            .add_global(llcx.f64_type(), Some(AddressSpace::default()), "a")
            .as_pointer_value();
        let slot_b = module
            .add_global(llcx.f64_type(), Some(AddressSpace::default()), "b")
            .as_pointer_value();

        let mut scopes = ScopeStack::new();
        scopes.bind("a".into(), slot_a);

        scopes.save_copy();
        assert_eq!(scopes.depth(), 1);
        assert_eq!(scopes.lookup("a"), Some(slot_a));

        // shadow inside the inner frame
        scopes.bind("a".into(), slot_b);
        assert_eq!(scopes.lookup("a"), Some(slot_b));

        scopes.restore();
        assert_eq!(scopes.depth(), 0);
        assert_eq!(scopes.lookup("a"), Some(slot_a));
    }

    #[test]
    fn fresh_save_hides_outer_bindings() {
        let llcx = Context::create();
        let module = llcx.create_module("scope_test");
        let slot = module
            .add_global(llcx.f64_type(), Some(AddressSpace::default()), "x")
            .as_pointer_value();

        let mut scopes = ScopeStack::new();
        scopes.bind("x".into(), slot);

        scopes.save_fresh();
        assert_eq!(scopes.lookup("x"), None);

        scopes.restore();
        assert_eq!(scopes.lookup("x"), Some(slot));
    }

    #[test]
    fn saves_balance_across_nesting() {
        let llcx = Context::create();
        let module = llcx.create_module("scope_test");
        let slot = module
            .add_global(llcx.f64_type(), Some(AddressSpace::default()), "x")
            .as_pointer_value();

        let mut scopes = ScopeStack::new();
        scopes.save_copy();
        scopes.save_fresh();
        scopes.bind("x".into(), slot);
        scopes.save_copy();
        assert_eq!(scopes.depth(), 3);
        scopes.restore();
        scopes.restore();
        scopes.restore();
        assert_eq!(scopes.depth(), 0);
        assert_eq!(scopes.lookup("x"), None);
    }
}
