//! The Dispatcher (§4.4): the behavior behind an action's Details. Raw
//! Native and the five derivations share one registry keyed by the
//! action's Details stub id — the Rust stand-in for "per-action private
//! storage owned by one Dispatcher", since a Dispatcher here is Rust code
//! (a function pointer or a derivation descriptor) rather than data that
//! can live inside a Cell.

use std::collections::HashMap;

use ren_value::heart::ActionRef;
use ren_value::{Cell, StubId};

use crate::error::ActionError;
use crate::generic::GenericOp;
use crate::host::ActionHost;

/// A Raw-Native dispatcher or a generic implementation: given the host
/// and the already-fulfilled, already-type-checked argument cells in
/// Paramlist order (hidden/local parameters included at their position),
/// produce the call's result.
pub type NativeFn<H> = fn(&mut H, &[Cell]) -> Result<Cell, ActionError>;

#[derive(Clone)]
pub enum Dispatcher<H: ActionHost> {
    RawNative(NativeFn<H>),
    /// Body block + binding specifier — a user-defined `func`/`function`
    /// (§3 Action variants). Evaluating the body is `ren-interp`'s job
    /// (it owns the Evaluator executor); this variant just carries the
    /// data the Action Executor hands off to it.
    Interpreted { body: StubId, specifier: Option<StubId> },
    /// Partially applies arguments via an exemplar Varlist aligned with
    /// the inner action's Paramlist (§4.4 Specialization).
    Specialized { exemplar: StubId, inner: ActionRef },
    /// The full pipeline, `steps[0]` included (§4.4 Cascade) — this
    /// dispatcher's own Paramlist equals `steps[0]`'s, so the arguments
    /// gathered for the cascade action are exactly what `steps[0]` wants;
    /// each later step is then called with the previous step's result as
    /// its sole argument.
    Cascade { steps: Vec<ActionRef> },
    /// A prelude block run in the inner action's built frame before it
    /// dispatches (§4.4 Adapt).
    Adapt { prelude: StubId, inner: ActionRef },
    /// Builds the inner's frame, then calls `outer` with it instead of
    /// calling `inner` directly (§4.4 Enclose).
    Enclose { inner: ActionRef, outer: ActionRef },
    /// Runs its body, expects a block back, and splices it into the
    /// caller's feed instead of returning normally (§4.4 Macro/Inliner).
    Macro { body: StubId, specifier: Option<StubId> },
    /// Consults `generics` for an implementation keyed by this operation
    /// and the first argument's heart tag (§4.4 "Generic dispatch").
    Generic(GenericOp),
    /// Accepts exactly the values in `typeset`'s positive Typeset bits;
    /// produced by e.g. `integer?` (§4.4 Action variants list).
    Typechecker(ren_value::Typeset),
}

/// The process-wide table mapping an action's Details id to its
/// Dispatcher (§4.2 root #5 "Native-action table entries" — every key is
/// contributed as a GC root by whichever crate owns the table, since a
/// Details stub reachable only from here must not be swept).
pub struct NativeTable<H: ActionHost> {
    entries: HashMap<StubId, Dispatcher<H>>,
}

impl<H: ActionHost> Default for NativeTable<H> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<H: ActionHost> NativeTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, details: StubId, dispatcher: Dispatcher<H>) {
        self.entries.insert(details, dispatcher);
    }

    pub fn get(&self, details: StubId) -> Result<&Dispatcher<H>, ActionError> {
        self.entries.get(&details).ok_or(ActionError::UnknownDispatcher(details))
    }

    /// Atomically replace a target's Dispatcher in place (§4.4 Hijack):
    /// every existing reference to the target action now invokes the
    /// replacement, since lookup is always by Details id, never by a
    /// dispatcher pointer cached elsewhere.
    pub fn hijack(&mut self, target_details: StubId, replacement: Dispatcher<H>) {
        self.entries.insert(target_details, replacement);
    }

    pub fn roots(&self) -> impl Iterator<Item = StubId> + '_ {
        self.entries.keys().copied()
    }
}
