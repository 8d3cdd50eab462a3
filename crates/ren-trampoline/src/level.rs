//! [`Level`]: one frame of the evaluator's explicit stack (§3, §4.3). Owns
//! a Feed, the Executor driving its state machine, a state byte, three
//! scratch-ish cells (output/spare/scratch), and the varlist when it is
//! in action dispatch.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ren_value::{Cell, StubId};

use crate::bounce::Bounce;
use crate::feed::Feed;
use crate::throw::Throw;

/// Monotonically increasing identity distinguishing one pushed Level from
/// another, even after the slot it occupied in the stack is reused — the
/// same "arenas + indices, not raw pointers" treatment `ren-value` gives
/// Stubs (Design Notes §9), applied to Levels instead of a linked-list
/// "prior Level" pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelId(pub u64);

/// Something handed back into a re-entered Executor's `step` describing
/// why it is being re-entered outside the ordinary "your sub-Level
/// finished" case.
#[derive(Debug, Clone)]
pub enum Pending {
    /// This Level is the identified target of an in-flight throw; decide
    /// whether to handle it or propagate by returning `Bounce::Thrown`
    /// again.
    Throw(Throw),
}

/// A function advancing one Level's state machine (§4.3). Generic over
/// `C`, the host context an embedding crate supplies (pool, canon,
/// dispatch table, tweak) — `ren-trampoline` itself never names that
/// type, so it stays free of a dependency on `ren-actions`/`ren-tweak`/
/// `ren-interp`.
pub trait Executor<C>: fmt::Debug {
    fn step(&mut self, level: &mut Level<C>, ctx: &mut C) -> Bounce<C>;
}

pub struct Level<C> {
    id: LevelId,
    /// Shared by `Rc` rather than owned: an argument-gathering sub-Level
    /// must consume from the exact same cursor its parent is mid-way
    /// through reading, the way a real Level's feed can be shared across
    /// several frames at once (§3, §4.3). `new_sharing` clones the handle;
    /// an independent Feed (a body block, a macro's reified result) gets
    /// its own `Rc` via `new`.
    pub feed: Rc<RefCell<Feed>>,
    executor: Option<Box<dyn Executor<C>>>,
    pub state: u8,
    pub output: Cell,
    pub spare: Cell,
    pub scratch: Cell,
    pub varlist: Option<StubId>,
    pub label: Option<StubId>,
    /// Kept alive past its sub-Level's drop (§3 Lifecycles) — used by a
    /// Cascader that must re-use its stolen sub-Level across several
    /// downstream stages.
    pub keepalive: bool,
    /// Whether a HALT thrown with no explicitly-marked catcher should
    /// stop unwinding here (§4.3 "Cancellation", §5).
    pub catchable: bool,
    /// Set by `Trampoline` when this Level is pushed via
    /// `Bounce::DelegateSublevel`: when it signals `Out`, the parent is
    /// treated as having also completed rather than being re-entered.
    pub(crate) delegate: bool,
    pub(crate) pending: Option<Pending>,
}

impl<C> fmt::Debug for Level<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Level")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("varlist", &self.varlist)
            .field("keepalive", &self.keepalive)
            .field("catchable", &self.catchable)
            .finish()
    }
}

impl<C> Level<C> {
    pub fn new(id: LevelId, feed: Feed, executor: Box<dyn Executor<C>>) -> Self {
        Self {
            id,
            feed: Rc::new(RefCell::new(feed)),
            executor: Some(executor),
            state: 0,
            output: Cell::trash(),
            spare: Cell::trash(),
            scratch: Cell::trash(),
            varlist: None,
            label: None,
            keepalive: false,
            catchable: false,
            delegate: false,
            pending: None,
        }
    }

    /// A sub-Level that reads from the same feed cursor as `self` — the
    /// normal case when gathering an action's arguments one step at a
    /// time, since each parameter must see the cells the previous one
    /// left behind (§4.3, §4.4).
    pub fn new_sharing(id: LevelId, parent: &Level<C>, executor: Box<dyn Executor<C>>) -> Self {
        Self {
            id,
            feed: Rc::clone(&parent.feed),
            executor: Some(executor),
            state: 0,
            output: Cell::trash(),
            spare: Cell::trash(),
            scratch: Cell::trash(),
            varlist: None,
            label: None,
            keepalive: false,
            catchable: false,
            delegate: false,
            pending: None,
        }
    }

    pub fn id(&self) -> LevelId {
        self.id
    }

    /// Re-stamp this Level's identity. Called by `Trampoline::push_*`
    /// when adopting a Level built independently of any particular
    /// Trampoline (e.g. returned from an Executor via `Bounce`), so
    /// identities stay unique within the stack that ends up owning it.
    pub(crate) fn restamp(&mut self, id: LevelId) {
        self.id = id;
    }

    pub fn catchable(mut self, yes: bool) -> Self {
        self.catchable = yes;
        self
    }

    pub fn with_varlist(mut self, varlist: StubId) -> Self {
        self.varlist = Some(varlist);
        self
    }

    pub fn with_label(mut self, label: StubId) -> Self {
        self.label = Some(label);
        self
    }

    /// Takes the pending throw, if this re-entry was for one. An Executor
    /// calls this at the top of `step` to tell "fresh sub-Level returned"
    /// apart from "I am being unwound through".
    pub fn take_pending(&mut self) -> Option<Pending> {
        self.pending.take()
    }

    /// Drive this Level's Executor exactly one step. `Trampoline` is the
    /// only normal caller; exposed so tests can drive a Level directly
    /// without a full Trampoline.
    pub fn step(&mut self, ctx: &mut C) -> Bounce<C> {
        let mut executor = self.executor.take().expect("Level executor missing mid-step");
        let bounce = executor.step(self, ctx);
        self.executor = Some(executor);
        bounce
    }
}
