//! The guarded-node list and its RAII handle (§4.2 "Guards", §5 "Resource
//! discipline"). `push_guard`/`pop_guard` in the source is a manually
//! balanced stack; here a [`GuardHandle`] drops itself, so a Rust panic
//! unwinding through a routine that guarded some temporaries still leaves
//! the guard stack balanced — strictly stronger than the C discipline,
//! which is exactly what a "systems-language implementation" buys you.

use std::cell::RefCell;
use std::rc::Rc;

use ren_value::StubId;

#[derive(Default)]
struct Inner {
    stack: Vec<StubId>,
}

/// Owns the process-wide guarded-node list. Cloning is cheap (`Rc`); all
/// clones share the same underlying stack, matching the single
/// process-wide list described in §4.2.
#[derive(Clone, Default)]
pub struct GuardStack {
    inner: Rc<RefCell<Inner>>,
}

impl GuardStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// `push_guard(node)`. Returns a handle whose `Drop` pops it back off.
    pub fn guard(&self, id: StubId) -> GuardHandle {
        self.inner.borrow_mut().stack.push(id);
        GuardHandle {
            stack: self.inner.clone(),
            id,
        }
    }

    /// All currently guarded ids, contributed as GC roots (§4.2 root #2).
    pub fn roots(&self) -> Vec<StubId> {
        self.inner.borrow().stack.clone()
    }

    pub fn is_balanced(&self) -> bool {
        self.inner.borrow().stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.inner.borrow().stack.len()
    }
}

/// A scoped guard on one Stub. Dropping it pops the node from the guard
/// stack. Popping is by identity, not strictly LIFO, so a guard dropped
/// out of order (e.g. stored in a struct field reordered during a panic
/// unwind) still removes exactly its own entry rather than corrupting the
/// stack.
pub struct GuardHandle {
    stack: Rc<RefCell<Inner>>,
    id: StubId,
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        let mut inner = self.stack.borrow_mut();
        if let Some(pos) = inner.stack.iter().rposition(|&g| g == self.id) {
            inner.stack.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ren_value::StubId;

    fn id(index: u32) -> StubId {
        StubId { index, generation: 0 }
    }

    #[test]
    fn guard_balances_on_drop() {
        let stack = GuardStack::new();
        {
            let _g1 = stack.guard(id(1));
            let _g2 = stack.guard(id(2));
            assert_eq!(stack.depth(), 2);
        }
        assert!(stack.is_balanced());
    }

    #[test]
    fn out_of_order_drop_removes_only_its_own_entry() {
        let stack = GuardStack::new();
        let g1 = stack.guard(id(1));
        let g2 = stack.guard(id(2));
        drop(g1);
        assert_eq!(stack.roots(), vec![id(2)]);
        drop(g2);
        assert!(stack.is_balanced());
    }
}
