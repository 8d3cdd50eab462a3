//! The (label, value, target) triple a non-local exit carries (§4.3
//! "Throws"). `target` identifies the Level that should catch it by
//! identity — the Trampoline's unwind loop drops every Level above the
//! target and then re-enters the target's own Executor with the throw
//! attached, letting that Executor decide whether it truly matches (e.g.
//! comparing `label` against the symbol a `catch` construct was built
//! with) or re-raises by returning `Bounce::Thrown` again.

use ren_value::{Cell, StubId};

use crate::level::LevelId;

#[derive(Debug, Clone)]
pub struct Throw {
    /// `None` for `return`-shaped throws that target a specific Level
    /// without a symbolic label; `Some(sym)` for `throw`/`unwind`/`halt`/
    /// `quit`, matched against a `catch` construct's expected word.
    pub label: Option<StubId>,
    pub value: Cell,
    pub target: LevelId,
}

impl Throw {
    pub fn new(label: Option<StubId>, value: Cell, target: LevelId) -> Self {
        Self { label, value, target }
    }
}
