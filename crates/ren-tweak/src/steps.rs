//! Step compilation (§4.5): a dotted/slashed path compiles to a stack of
//! step cells — a lifted root plus a sequence of pickers. The compiled
//! [`Steps`] value is reusable: `get` returns it alongside the fetched
//! value, and the exact same `Steps` can later be handed to `set`.
//!
//! Evaluating a Group picker (`obj.(pick-expr)`) needs the evaluator, so
//! this crate never sees a raw `group!` step — `ren-interp` evaluates any
//! Group cell in the source path before building a [`Picker::Value`], the
//! way §4.5 describes ("pickers, typically quoted words or evaluated
//! groups").

use ren_value::{Cell, StubId};

/// One step after the root: either a symbol (an object/frame/module
/// member name) or an already-resolved value used as an index/selector
/// (an integer picking into a `pair!`/`block!`, or any other picker value
/// a generic PICK-like step might accept).
#[derive(Debug, Clone, PartialEq)]
pub enum Picker {
    Symbol(StubId),
    Index(usize),
}

/// The path's root: either an explicit binding slot (`obj.field`, where
/// `obj` resolved through `ren_binding::resolve`) or a value already in
/// hand (the coupled object `.field` resolves to via
/// `ren_binding::find_coupling`, or any other pre-evaluated root a caller
/// wants to walk pickers against).
#[derive(Debug, Clone, PartialEq)]
pub enum RootRef {
    Slot { varlist: StubId, index: usize },
    Value(Cell),
}

/// A compiled path: a root plus the pickers applied to it, in order.
/// `get:steps` hands this back to the caller so `set` can be called with
/// the identical path without recompiling it (§4.5, §8 "Applying the same
/// `get:steps` twice yields equal values").
#[derive(Debug, Clone, PartialEq)]
pub struct Steps {
    pub root: RootRef,
    pub pickers: Vec<Picker>,
}

impl Steps {
    pub fn new(root: RootRef) -> Self {
        Self { root, pickers: Vec::new() }
    }

    pub fn with_pickers(root: RootRef, pickers: Vec<Picker>) -> Self {
        Self { root, pickers }
    }

    pub fn push(&mut self, picker: Picker) {
        self.pickers.push(picker);
    }
}
