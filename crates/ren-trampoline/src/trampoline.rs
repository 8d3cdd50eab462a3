//! The Trampoline (§4.3): the sole outer evaluation loop. Reads the
//! topmost Level, dispatches to its Executor, and interprets the returned
//! [`Bounce`]. Never recurses into itself for further evaluation — every
//! suspension is a `Level` pushed onto `stack` and every resumption is
//! the next iteration of `run`'s loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace, warn};

use ren_value::Cell;

use crate::bounce::Bounce;
use crate::error::EvalError;
use crate::level::{Level, LevelId, Pending};
use crate::throw::Throw;

/// A process-wide cancellation flag (§4.3 "Cancellation", §5). Cloning is
/// cheap; an embedder hands a clone to e.g. a Ctrl-C handler so it can be
/// set from outside the evaluation loop without any other shared state.
#[derive(Debug, Clone, Default)]
pub struct HaltFlag(Arc<AtomicBool>);

impl HaltFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The explicit Level stack plus the HALT flag it polls at every step
/// boundary. Generic over `C`, the host context threaded into every
/// Executor (§4.3 Design Notes: "Each Executor becomes a struct owning
/// its own state and a `step(&mut self) -> Bounce` method").
pub struct Trampoline<C> {
    stack: Vec<Level<C>>,
    next_id: u64,
    halt: HaltFlag,
    /// The symbol a HALT throw carries as its label (§4.3 "a throw
    /// labelled HALT"). `ren-interp` interns `HALT` once at startup and
    /// wires it in here; left `None` in a bare `Trampoline` (as used by
    /// this crate's own unit tests) where no canon table exists to intern
    /// against.
    halt_label: Option<ren_value::StubId>,
    /// Optional step budget (§5 "an optional cycle-limit counter...
    /// polled at every step"). `ren-config` wires this in from a boot
    /// setting; left `None` (unbounded) otherwise.
    cycle_limit: Option<u64>,
    cycles: u64,
}

impl<C> Default for Trampoline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Trampoline<C> {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            next_id: 0,
            halt: HaltFlag::new(),
            halt_label: None,
            cycle_limit: None,
            cycles: 0,
        }
    }

    pub fn halt_flag(&self) -> HaltFlag {
        self.halt.clone()
    }

    /// Bound the number of trampoline steps a single `run` may take
    /// before a HALT is injected as though the host had raised it
    /// (§5 "Cancellation & timeouts"). `None` leaves the run unbounded.
    pub fn set_cycle_limit(&mut self, limit: Option<u64>) {
        self.cycle_limit = limit;
    }

    /// Wire in the interned `HALT` symbol so an uncaught HALT throw is
    /// reported to the host with a recognizable label instead of `None`
    /// (§4.3 "Cancellation", §8 scenario 6).
    pub fn set_halt_label(&mut self, label: ren_value::StubId) {
        self.halt_label = Some(label);
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    fn fresh_id(&mut self) -> LevelId {
        let id = LevelId(self.next_id);
        self.next_id += 1;
        id
    }

    /// `Push_Level`: allocate the next id and push. Returns the id so the
    /// caller can build a `Throw` targeting it (e.g. a `catch` construct
    /// wants to target its own Level).
    pub fn push_level(
        &mut self,
        feed: crate::feed::Feed,
        executor: Box<dyn crate::level::Executor<C>>,
    ) -> LevelId {
        // `Level::new` wraps `feed` in a fresh `Rc<RefCell<_>>`; this entry
        // point is for a Level with nothing to share it with yet.
        let id = self.fresh_id();
        self.stack.push(Level::new(id, feed, executor));
        id
    }

    /// Adopt a Level built independently of this Trampoline (the normal
    /// case for one returned from an Executor via `Bounce`), re-stamping
    /// its identity so it is unique within this stack.
    pub fn push_level_built(&mut self, level: Level<C>) -> LevelId {
        let id = self.fresh_id();
        self.push_built(id, level)
    }

    fn push_built(&mut self, id: LevelId, level: Level<C>) -> LevelId {
        let mut level = level;
        level.restamp(id);
        self.stack.push(level);
        id
    }

    /// `Drop_Level`: pop the top Level unconditionally. Exposed for a host
    /// that needs to tear down a stack on an abort path; `run` drives
    /// ordinary pops itself via `Bounce::Out`.
    pub fn drop_level(&mut self) -> Option<Level<C>> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Level<C>> {
        self.stack.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Level<C>> {
        self.stack.last_mut()
    }

    /// Outermost Level marked catchable, scanning from the bottom of the
    /// stack — the target a HALT throw is injected against when nothing
    /// more specific claims it (§4.3 "Cancellation").
    fn outermost_catchable(&self) -> Option<LevelId> {
        self.stack.iter().find(|l| l.catchable).map(|l| l.id())
    }

    /// Drive the pushed stack to completion: repeatedly step the top
    /// Level and interpret its Bounce, until the stack empties with a
    /// final `Out` (success) or an uncaught throw/failure propagates all
    /// the way down (error).
    pub fn run(&mut self, ctx: &mut C) -> Result<Cell, EvalError> {
        loop {
            if self.stack.is_empty() {
                return Err(EvalError::EmptyStack);
            }

            self.cycles += 1;
            if let Some(limit) = self.cycle_limit {
                if self.cycles > limit {
                    warn!(target: "trampoline", cycles = self.cycles, limit, "cycle limit exceeded, injecting HALT");
                    self.halt.raise();
                }
            }

            if self.halt.is_raised() {
                self.halt.clear();
                let target = self
                    .outermost_catchable()
                    .unwrap_or_else(|| self.stack[0].id());
                warn!(target: "trampoline", "HALT signal observed at step boundary");
                self.unwind_to(Throw::new(self.halt_label, Cell::trash(), target))?;
                continue;
            }

            let top_id = self.stack.last().expect("checked non-empty above").id();
            let bounce = {
                let level = self.stack.last_mut().expect("checked non-empty above");
                level.step(ctx)
            };

            match bounce {
                Bounce::Out => {
                    let mut current = self.stack.pop().expect("top level present");
                    loop {
                        if self.stack.is_empty() {
                            return Ok(current.output);
                        }
                        let was_delegate = current.delegate;
                        {
                            let parent = self.stack.last_mut().expect("parent present");
                            parent.output = current.output.clone();
                        }
                        if !was_delegate {
                            trace!(target: "trampoline", depth = self.stack.len(), "sub-level returned, resuming parent");
                            break;
                        }
                        // `current` was a delegate target: the parent's own
                        // answer *is* current's answer, so the parent is
                        // popped too rather than re-entered (§4.3 DELEGATE),
                        // and the loop keeps propagating upward in case that
                        // parent was itself delegated to.
                        current = self.stack.pop().expect("parent present");
                    }
                }
                Bounce::Invisible => {
                    let finished = self.stack.pop().expect("top level present");
                    if self.stack.is_empty() {
                        return Ok(finished.output);
                    }
                }
                Bounce::ContinueSublevel(sub) | Bounce::Downshifted(sub) => {
                    let id = self.fresh_id();
                    self.push_built(id, sub);
                }
                Bounce::DelegateSublevel(mut sub) => {
                    sub.delegate = true;
                    let id = self.fresh_id();
                    self.push_built(id, sub);
                }
                Bounce::RedoChecked | Bounce::RedoUnchecked => {
                    // Loop again with the same top Level; its own state
                    // byte (set before returning this Bounce) decides what
                    // happens on re-entry.
                }
                Bounce::Thrown(throw) => {
                    if throw.target == top_id {
                        // The Level that was just re-entered with this
                        // exact throw pending declined to handle it
                        // (it re-emitted `Thrown` targeting itself rather
                        // than returning `Out`) — there is nowhere lower
                        // to unwind to, so this is genuinely uncaught
                        // rather than a reason to set `pending` again and
                        // loop (§4.3 "giving each executor exactly one
                        // chance to catch").
                        self.stack.pop();
                        return Err(EvalError::Uncaught { label: throw.label });
                    }
                    self.unwind_to(throw)?;
                }
                Bounce::Failed(err) => {
                    // §7: an abrupt failure is caught only at a `rescue`
                    // boundary, which in this design is the Rust call that
                    // drove this very `run` (there is no in-stack `catch`
                    // construct to re-enter with a pending value the way a
                    // label-matched `Thrown` would be). Unwinding the whole
                    // stack and returning the original error preserves its
                    // message instead of losing it to an untagged Throw.
                    debug!(target: "trampoline", error = %err, "abrupt failure, unwinding to the rescue boundary");
                    self.stack.clear();
                    return Err(err);
                }
            }
        }
    }

    /// Pop Levels above `throw.target`, then re-enter the target's own
    /// Executor with the throw attached via `Pending::Throw`. If the
    /// target isn't found (already popped, or never pushed), the throw is
    /// uncaught.
    fn unwind_to(&mut self, throw: Throw) -> Result<(), EvalError> {
        loop {
            match self.stack.last() {
                Some(level) if level.id() == throw.target => {
                    self.stack.last_mut().unwrap().pending = Some(Pending::Throw(throw));
                    return Ok(());
                }
                Some(_) => {
                    self.stack.pop();
                }
                None => {
                    return Err(EvalError::Uncaught { label: throw.label });
                }
            }
        }
    }
}
