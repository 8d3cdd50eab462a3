//! The two-byte dual protocol (§4.5): every `tweak` call is either a
//! read (`Incoming::Pick`) or a write (`Incoming::Poke`, carrying a
//! lifted replacement), and returns a [`Dual`] that disambiguates "the
//! slot's plain value" from "the slot holds a getter/setter action that
//! must be invoked to produce the real value".
//!
//! `ren-tweak` has no Trampoline of its own — invoking a `Dual::Getter`
//! action is `ren-interp`'s job, since only it can push a Level and run
//! the Action Executor. This crate's contract stops at handing back the
//! `ActionRef` to invoke.

use ren_value::{Cell, heart::ActionRef};

#[derive(Debug, Clone)]
pub enum Incoming {
    /// This is a read.
    Pick,
    /// This is a write; the payload is lifted (quoted/quasi) so an
    /// antiform replacement (e.g. storing a null into a variable slot)
    /// can be told apart from "no replacement" (§3).
    Poke(Cell),
}

#[derive(Debug, Clone)]
pub enum Dual {
    /// A lifted value — the caller unlifts it to get the real value
    /// (§4.5 "two-byte return").
    Value(Cell),
    /// The slot holds a reactive getter/setter action, not a plain
    /// value; the caller must invoke it (with the read/write intent
    /// that triggered this tweak) to produce the real answer.
    Getter(ActionRef),
}

impl Dual {
    /// Unwrap the common case: a plain lifted value, unlifted. Panics if
    /// this dual turned out to be a reactive getter — callers expecting
    /// that case should match on `Dual` directly instead.
    pub fn into_plain(self) -> Cell {
        match self {
            Dual::Value(v) => v.unlift(),
            Dual::Getter(_) => panic!("Dual::into_plain called on a reactive Getter dual"),
        }
    }
}
