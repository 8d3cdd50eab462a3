//! The [`Interpreter`] handle: the one place that owns a `StubPool`, a
//! `Gc`, a `Canon`, and the native/generic dispatch tables (§9 "Global
//! mutable state"). Everything below it stays acyclic by depending on
//! `ActionHost` instead of this struct directly; this is the type that
//! finally implements it.
//!
//! A top-level evaluation or action call pushes a Level onto the owned
//! Trampoline and drives it to completion before returning, so between
//! calls the Level stack is always empty — `collect` relies on that to
//! avoid needing to walk it for roots.

use std::collections::HashMap;

use ren_actions::dispatcher::NativeTable;
use ren_actions::generic::GenericTable;
use ren_actions::host::ActionHost;
use ren_actions::action_executor::ActionExecutor;
use ren_actions::step::EvaluatorExecutor;
use ren_binding::canon::Canon;
use ren_gc::{Gc, GuardHandle};
use ren_trampoline::{Feed, HaltFlag, Trampoline};
use ren_value::context::{make_varlist, varlist_set, varlist_slot};
use ren_value::heart::ActionRef;
use ren_value::param::{ParamClass, ParamDescriptor, Typeset};
use ren_value::paramlist::{find_param_index, make_paramlist};
use ren_value::{Cell, ContextKind, StubContent, StubFlavor, StubId, StubPool};

use crate::error::InterpError;

pub struct Interpreter {
    pub(crate) pool: StubPool,
    pub(crate) canon: Canon,
    gc: Gc,
    natives: NativeTable<Interpreter>,
    generics: GenericTable<Interpreter>,
    /// The one Module-kind Varlist every top-level word binds against
    /// unless it is inside a function's own frame (§4.6). Grows by one
    /// slot per `define_global`, mirroring how the source adds a word to
    /// a context on the fly rather than requiring every member declared
    /// up front.
    globals: StubId,
    trampoline: Trampoline<Interpreter>,
}

impl Interpreter {
    pub fn new() -> Self {
        let mut pool = StubPool::new();
        let mut canon = Canon::new();
        let keylist = make_paramlist(&mut pool, Cell::trash(), Vec::new());
        let globals = make_varlist(&mut pool, ContextKind::Module, keylist, Vec::new());
        let _ = pool.manage(keylist);
        let _ = pool.manage(globals);

        let mut interp = Self {
            pool,
            canon,
            gc: Gc::new(),
            natives: NativeTable::new(),
            generics: GenericTable::new(),
            globals,
            trampoline: Trampoline::new(),
        };
        let halt_symbol = interp.intern(b"HALT");
        interp.trampoline.set_halt_label(halt_symbol);
        crate::natives::register_natives(&mut interp);
        interp
    }

    /// The interned `HALT` symbol (§4.3 "Cancellation") — compared against
    /// an uncaught throw's label to tell a cancelled evaluation apart from
    /// any other uncaught exit.
    pub fn halt_symbol(&mut self) -> StubId {
        self.intern(b"HALT")
    }

    pub fn intern(&mut self, spelling: &[u8]) -> StubId {
        self.canon.intern(&mut self.pool, spelling)
    }

    pub fn spelling_of(&self, symbol: StubId) -> Option<&[u8]> {
        self.canon.spelling_of(&self.pool, symbol)
    }

    /// Read-only access to the Stub pool (§6 embedder API surface:
    /// extraction functions need to peek at a Cell's payload stub).
    pub fn pool(&self) -> &ren_value::StubPool {
        &self.pool
    }

    /// Mutable access to the Stub pool (§6 embedder API surface:
    /// construction/allocation functions need to make and manage stubs).
    pub fn pool_mut(&mut self) -> &mut ren_value::StubPool {
        &mut self.pool
    }

    /// `get:steps` (§4.5): walk a compiled path and unlift the plain
    /// value at its end. Fails on a reactive `Dual::Getter` slot — no
    /// native in this workspace installs one, so that branch has no
    /// exerciser yet; a caller that needs it should match on
    /// `ren_tweak::get` directly instead of going through this
    /// convenience wrapper.
    pub fn tweak_get(&self, steps: &ren_tweak::Steps, meta: bool) -> Result<Cell, InterpError> {
        match ren_tweak::get(&self.pool, steps, meta) {
            Ok(dual) => Ok(dual.into_plain()),
            Err(failure) => Err(InterpError::Tweak(failure.error)),
        }
    }

    /// `set(steps, newval)` (§4.5): lift `value` and poke it through the
    /// writeback chain.
    pub fn tweak_set(&mut self, steps: &ren_tweak::Steps, value: Cell) -> Result<(), InterpError> {
        ren_tweak::set(&mut self.pool, steps, ren_tweak::Incoming::Poke(value.lift()))
            .map_err(|failure| InterpError::Tweak(failure.error))
    }

    /// A process-wide HALT signal (§4.3 Cancellation): cloning is cheap,
    /// so an embedder's Ctrl-C handler can raise it from outside the
    /// evaluation loop.
    pub fn halt_flag(&self) -> HaltFlag {
        self.trampoline.halt_flag()
    }

    /// Boot-time GC knobs (§4.2 "Ballast and disable"), wired in from
    /// `ren-config`'s parsed `[gc]` table.
    pub fn set_gc_torture(&mut self, on: bool) {
        self.gc.set_torture(on);
    }

    pub fn set_gc_ballast(&mut self, bytes: usize) {
        self.gc.set_ballast(bytes);
    }

    pub fn set_gc_enabled(&mut self, on: bool) {
        if on {
            self.gc.enable();
        } else {
            self.gc.disable();
        }
    }

    /// Boot-time step budget (§5 "Cancellation & timeouts"), wired in
    /// from `ren-config`'s parsed `[limits]` table.
    pub fn set_cycle_limit(&mut self, limit: Option<u64>) {
        self.trampoline.set_cycle_limit(limit);
    }

    /// Define or overwrite a global word's value, growing the globals
    /// Varlist's keylist and slot storage by one entry the first time
    /// `name` is used (§4.6 "a word becomes known to a context").
    pub fn define_global(&mut self, name: &[u8], value: Cell) -> StubId {
        let symbol = self.canon.intern(&mut self.pool, name);
        let keylist = ren_value::context::varlist_keylist(&self.pool, self.globals)
            .expect("globals always carries a keylist");
        let already_present = find_param_index(&self.pool, keylist, symbol)
            .ok()
            .flatten()
            .is_some();
        if !already_present {
            if let Ok(stub) = self.pool.get_mut(keylist) {
                if let StubContent::Dynamic(cells) = &mut stub.content {
                    cells.push(Cell::fundamental(ren_value::Heart::Param(ParamDescriptor::new(
                        symbol,
                        ParamClass::Normal,
                        Typeset::ANY,
                    ))));
                }
            }
            if let Ok(stub) = self.pool.get_mut(self.globals) {
                if let StubContent::Dynamic(cells) = &mut stub.content {
                    cells.push(Cell::trash());
                }
            }
        }
        varlist_set(&mut self.pool, self.globals, symbol, value)
            .expect("slot just ensured to exist");
        symbol
    }

    /// A bound Word cell referring to `name` in the globals context —
    /// what a top-level script's word literals would carry as their
    /// binding, had this repo a lexer to produce them from source text.
    pub fn global_word(&mut self, name: &[u8]) -> Cell {
        let symbol = self.canon.intern(&mut self.pool, name);
        Cell::bound_word(symbol, self.globals)
    }

    pub fn global_value(&self, name: &[u8]) -> Option<Cell> {
        let symbol = self.canon.lookup(name)?;
        ren_value::context::varlist_get(&self.pool, self.globals, symbol).ok().cloned()
    }

    /// Register a native action: build its Paramlist, a fresh (empty)
    /// Details stub, and wire `dispatcher` into the native table keyed
    /// by that Details id (§4.4).
    pub fn make_native(&mut self, params: Vec<ParamDescriptor>, dispatcher: ren_actions::dispatcher::Dispatcher<Self>) -> ActionRef {
        let paramlist = make_paramlist(&mut self.pool, Cell::trash(), params);
        let details = ren_value::details::make_details(&mut self.pool, Vec::new());
        let _ = self.pool.manage(paramlist);
        let _ = self.pool.manage(details);
        self.natives.register(details, dispatcher);
        ActionRef { paramlist, details }
    }

    pub fn register_generic(&mut self, op: ren_actions::generic::GenericOp, heart: ren_value::HeartTag, f: ren_actions::dispatcher::NativeFn<Self>) {
        self.generics.register(op, heart, f);
    }

    /// Build a Specialize derivation (§4.4): `overrides` fill the named
    /// parameters permanently and hide them from the call surface; every
    /// other parameter of `inner` keeps its own class/typeset, unchanged,
    /// so `:append` itself is untouched by specializing a copy of it.
    pub fn specialize(&mut self, inner: ActionRef, overrides: &[(StubId, Cell)]) -> ActionRef {
        let inner_params = ren_value::paramlist::paramlist_params(&self.pool, inner.paramlist)
            .expect("inner action has a valid paramlist");
        let mut outer_params = Vec::with_capacity(inner_params.len());
        let mut exemplar_slots = Vec::with_capacity(inner_params.len());
        for param in inner_params {
            let fixed = overrides.iter().find(|(sym, _)| *sym == param.symbol);
            if let Some((_, value)) = fixed {
                outer_params.push(param.hidden());
                exemplar_slots.push(value.clone());
            } else {
                outer_params.push(param);
                exemplar_slots.push(Cell::trash());
            }
        }
        let exemplar_keylist = make_paramlist(&mut self.pool, Cell::trash(), outer_params.clone());
        let exemplar = make_varlist(&mut self.pool, ContextKind::Object, exemplar_keylist, exemplar_slots);
        let _ = self.pool.manage(exemplar_keylist);
        let _ = self.pool.manage(exemplar);
        self.make_native(outer_params, ren_actions::dispatcher::Dispatcher::Specialized { exemplar, inner })
    }

    /// Build a Cascade derivation (§4.4): `steps[0]`'s Paramlist becomes
    /// the cascade's own, so calling it gathers exactly what `steps[0]`
    /// wants and feeds every later step its predecessor's single result.
    pub fn cascade(&mut self, steps: Vec<ActionRef>) -> ActionRef {
        let params = ren_value::paramlist::paramlist_params(&self.pool, steps[0].paramlist)
            .expect("first cascade step has a valid paramlist");
        self.make_native(params, ren_actions::dispatcher::Dispatcher::Cascade { steps })
    }

    /// Build a Macro/Inliner (§4.4): `body` must evaluate to a block,
    /// which is then spliced into the caller's feed instead of returned.
    pub fn make_macro(&mut self, params: Vec<ParamDescriptor>, body: StubId) -> ActionRef {
        self.make_native(params, ren_actions::dispatcher::Dispatcher::Macro { body, specifier: None })
    }

    /// Run `array` (a Source block) to completion as a single top-level
    /// evaluation (§4.3 Evaluator). The owned Trampoline is drained
    /// before and after, so no Level survives a call across this
    /// boundary.
    pub fn eval_block(&mut self, array: StubId) -> Result<Cell, InterpError> {
        let mut tramp = std::mem::take(&mut self.trampoline);
        tramp.push_level(Feed::from_array(array), Box::new(EvaluatorExecutor::<Self>::new()));
        let result = tramp.run(self);
        self.trampoline = tramp;
        Ok(result?)
    }

    /// Invoke `action` directly with already-evaluated `args`, skipping
    /// fulfillment entirely — the Rust-side equivalent of a host calling
    /// into an action! value it already holds (§6).
    pub fn call(&mut self, action: ActionRef, args: Vec<Cell>) -> Result<Cell, InterpError> {
        let mut tramp = std::mem::take(&mut self.trampoline);
        let exec = ActionExecutor::<Self>::already_gathered(action, args);
        tramp.push_level(Feed::from_cells(Vec::new()), Box::new(exec));
        let result = tramp.run(self);
        self.trampoline = tramp;
        Ok(result?)
    }

    /// Run one collection cycle (§4.2). Only meaningful between
    /// top-level calls, where the Trampoline is always empty — a GC
    /// trigger mid-evaluation would need the running Level stack's roots
    /// threaded in too, which no Executor here currently does.
    pub fn collect(&mut self) -> Result<ren_gc::SweepReport, InterpError> {
        let mut extra_roots: Vec<StubId> = self.canon.roots();
        extra_roots.extend(self.natives.roots());
        extra_roots.push(self.globals);
        let report = self.gc.collect(&mut self.pool, extra_roots, |_| {})?;
        Ok(report)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl ren_config::InterpreterConfigSink for Interpreter {
    fn set_gc_enabled(&mut self, on: bool) {
        Interpreter::set_gc_enabled(self, on);
    }

    fn set_gc_torture(&mut self, on: bool) {
        Interpreter::set_gc_torture(self, on);
    }

    fn set_gc_ballast(&mut self, bytes: usize) {
        Interpreter::set_gc_ballast(self, bytes);
    }

    fn set_cycle_limit(&mut self, limit: Option<u64>) {
        Interpreter::set_cycle_limit(self, limit);
    }
}

impl ActionHost for Interpreter {
    fn pool(&self) -> &StubPool {
        &self.pool
    }

    fn pool_mut(&mut self) -> &mut StubPool {
        &mut self.pool
    }

    fn natives(&self) -> &NativeTable<Self> {
        &self.natives
    }

    fn natives_mut(&mut self) -> &mut NativeTable<Self> {
        &mut self.natives
    }

    fn generics(&self) -> &GenericTable<Self> {
        &self.generics
    }

    fn guard(&mut self, id: StubId) -> GuardHandle {
        self.gc.guard_stack().guard(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ren_tweak::{Picker, RootRef, Steps};
    use ren_value::Heart;

    /// `obj: make object! [a: make object! [b: 1]]`; `obj.a.b: 10` then
    /// `get $obj.a.b` yields `10` (§8 scenario 4), driven through the
    /// `Interpreter`'s globals rather than a bare `StubPool`.
    #[test]
    fn generalized_set_through_a_global_nested_object_round_trips() {
        let mut interp = Interpreter::new();
        let sym_b = interp.intern(b"b");
        let inner_keylist = make_paramlist(
            &mut interp.pool,
            Cell::trash(),
            vec![ParamDescriptor::new(sym_b, ParamClass::Normal, Typeset::ANY)],
        );
        let inner = make_varlist(&mut interp.pool, ContextKind::Object, inner_keylist, vec![Cell::integer(1)]);
        let _ = interp.pool.manage(inner_keylist);
        let _ = interp.pool.manage(inner);

        interp.define_global(b"obj", Cell::context(ContextKind::Object, inner));
        let global_value = interp.global_value(b"obj").unwrap();
        let Heart::Context(ContextKind::Object, _) = global_value.heart else { panic!("expected object") };

        let keylist = ren_value::context::varlist_keylist(&interp.pool, interp.globals).unwrap();
        let obj_index = find_param_index(&interp.pool, keylist, interp.intern(b"obj")).unwrap().unwrap();

        let steps = Steps::with_pickers(
            RootRef::Slot { varlist: interp.globals, index: obj_index },
            vec![Picker::Symbol(sym_b)],
        );

        interp.tweak_set(&steps, Cell::integer(10)).unwrap();
        assert_eq!(interp.tweak_get(&steps, false).unwrap(), Cell::integer(10));
    }
}
