//! The Action Executor (§4.4): fulfills an action's parameters one at a
//! time off the calling feed, builds the call's Varlist (its frame), then
//! hands off to the Dispatcher named by its Details. Every derivation
//! (Specialize, Cascade, Adapt, Enclose, Macro) is resolved here too,
//! since each is just a different thing to do once fulfillment is done.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;

use ren_trampoline::{Bounce, EvalError, Executor, Feed, Level, LevelId};
use ren_value::heart::ActionRef;
use ren_value::param::ParamClass;
use ren_value::{Cell, ContextKind, Heart, ParamDescriptor, StubId};

use crate::derive::cascade::CascadeExecutor;
use crate::dispatcher::Dispatcher;
use crate::error::ActionError;
use crate::host::ActionHost;
use crate::step::EvaluatorExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Gathering,
    AwaitingArg,
    Dispatching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchStage {
    Enter,
    AfterSub,
}

/// What `AfterSub` should do once the sub-Level it pushed returns,
/// distinguishing the several derivations that need a continuation
/// (Adapt's prelude, Enclose's inner call) from the one that needs none
/// set (a Macro's splice — see `dispatch_after_sub`).
#[derive(Debug, Clone)]
enum Continuation {
    MacroSplice,
    AdaptPrelude { inner: ActionRef },
    EncloseInner { outer: ActionRef, frame: StubId },
}

pub struct ActionExecutor<H> {
    action: ActionRef,
    loaded: bool,
    params: Vec<ParamDescriptor>,
    gathered: Vec<Cell>,
    prefill: HashMap<usize, Cell>,
    active_refinements: HashSet<StubId>,
    index: usize,
    refinement_group_active: bool,
    filling: usize,
    phase: Phase,
    dispatch_stage: DispatchStage,
    continuation: Option<Continuation>,
    _marker: PhantomData<fn() -> H>,
}

impl<H: ActionHost + 'static> ActionExecutor<H> {
    pub fn new(action: ActionRef) -> Self {
        Self {
            action,
            loaded: false,
            params: Vec::new(),
            gathered: Vec::new(),
            prefill: HashMap::new(),
            active_refinements: HashSet::new(),
            index: 0,
            refinement_group_active: true,
            filling: 0,
            phase: Phase::Gathering,
            dispatch_stage: DispatchStage::Enter,
            continuation: None,
            _marker: PhantomData,
        }
    }

    /// Pre-fill one parameter slot by index rather than gathering it from
    /// the feed — used for an infix retrigger's left-hand side and for
    /// feeding a Cascade step its predecessor's result (§4.4).
    pub fn with_prefill(mut self, index: usize, value: Cell) -> Self {
        self.prefill.insert(index, value);
        self
    }

    pub fn with_refinements(mut self, refinements: HashSet<StubId>) -> Self {
        self.active_refinements = refinements;
        self
    }

    /// Every argument is already known: skip fulfillment entirely and go
    /// straight to building the frame and dispatching. Used whenever one
    /// derivation's fulfillment produces the exact argument list another
    /// action needs (Specialize's inner call, a Cascade's first step, an
    /// Adapt's post-prelude re-invocation, Enclose's inner and outer
    /// calls).
    pub fn already_gathered(action: ActionRef, values: Vec<Cell>) -> Self {
        let mut exec = Self::new(action);
        exec.gathered = values;
        exec.loaded = true;
        exec
    }

    fn step_gathering(&mut self, level: &mut Level<H>, ctx: &mut H) -> Bounce<H> {
        loop {
            if self.index >= self.params.len() {
                return self.finish_gathering(level, ctx);
            }
            let param = self.params[self.index];

            if param.is_hidden() {
                let value = self.prefill.remove(&self.index).unwrap_or(Cell::trash());
                self.gathered.push(value);
                self.index += 1;
                continue;
            }

            if matches!(param.class, ParamClass::Local | ParamClass::Return) {
                self.gathered.push(Cell::trash());
                self.index += 1;
                continue;
            }

            if param.class == ParamClass::Refinement {
                let active = self.active_refinements.contains(&param.symbol);
                self.refinement_group_active = active;
                self.gathered.push(Cell::logic(active));
                self.index += 1;
                continue;
            }

            if !self.refinement_group_active {
                self.gathered.push(Cell::null());
                self.index += 1;
                continue;
            }

            if let Some(value) = self.prefill.remove(&self.index) {
                if !param.accepts(&value.heart) {
                    return Bounce::Failed(ActionError::TypeMismatch.into());
                }
                self.gathered.push(value);
                self.index += 1;
                continue;
            }

            let pool = ctx.pool();
            let at_end = level.feed.borrow().is_end(pool);
            if at_end {
                if param.is_endable() {
                    self.gathered.push(Cell::null());
                    self.index += 1;
                    continue;
                }
                return Bounce::Failed(ActionError::EndOfFeed.into());
            }

            match param.class {
                ParamClass::HardQuote => {
                    let cell = level.feed.borrow_mut().next(pool).expect("checked not at end");
                    if !param.accepts(&cell.heart) {
                        return Bounce::Failed(ActionError::TypeMismatch.into());
                    }
                    self.gathered.push(cell);
                    self.index += 1;
                    continue;
                }
                ParamClass::SoftQuote => {
                    let peeked = level.feed.borrow().peek(pool).expect("checked not at end");
                    if let Heart::Group(array) = peeked.heart {
                        level.feed.borrow_mut().next(pool);
                        self.filling = self.index;
                        self.phase = Phase::AwaitingArg;
                        let sub = Level::new(LevelId(0), Feed::from_array(array), Box::new(EvaluatorExecutor::<H>::new()));
                        return Bounce::ContinueSublevel(sub);
                    }
                    let cell = level.feed.borrow_mut().next(pool).expect("checked not at end");
                    if !param.accepts(&cell.heart) {
                        return Bounce::Failed(ActionError::TypeMismatch.into());
                    }
                    self.gathered.push(cell);
                    self.index += 1;
                    continue;
                }
                ParamClass::Tight => {
                    self.filling = self.index;
                    self.phase = Phase::AwaitingArg;
                    let sub = Level::new_sharing(LevelId(0), level, Box::new(crate::step::StepperExecutor::<H>::tight()));
                    return Bounce::ContinueSublevel(sub);
                }
                ParamClass::Normal => {
                    self.filling = self.index;
                    self.phase = Phase::AwaitingArg;
                    let sub = Level::new_sharing(LevelId(0), level, Box::new(crate::step::StepperExecutor::<H>::new()));
                    return Bounce::ContinueSublevel(sub);
                }
                ParamClass::Refinement | ParamClass::Local | ParamClass::Return => unreachable!(),
            }
        }
    }

    fn step_awaiting_arg(&mut self, level: &mut Level<H>, _ctx: &mut H) -> Bounce<H> {
        let value = level.output.clone();
        let param = self.params[self.filling];
        if !param.accepts(&value.heart) {
            return Bounce::Failed(ActionError::TypeMismatch.into());
        }
        self.gathered.push(value);
        self.index += 1;
        self.phase = Phase::Gathering;
        Bounce::RedoUnchecked
    }

    fn finish_gathering(&mut self, level: &mut Level<H>, ctx: &mut H) -> Bounce<H> {
        let varlist = ren_value::context::make_varlist(
            ctx.pool_mut(),
            ContextKind::Frame,
            self.action.paramlist,
            self.gathered.clone(),
        );
        level.varlist = Some(varlist);
        self.phase = Phase::Dispatching;
        self.dispatch_enter(level, ctx)
    }

    fn dispatch_enter(&mut self, level: &mut Level<H>, ctx: &mut H) -> Bounce<H> {
        let dispatcher = match ctx.natives().get(self.action.details) {
            Ok(d) => d.clone(),
            Err(e) => return Bounce::Failed(e.into()),
        };
        match dispatcher {
            Dispatcher::RawNative(f) => match f(ctx, &self.gathered) {
                Ok(v) => {
                    level.output = v;
                    Bounce::Out
                }
                Err(e) => Bounce::Failed(e.into()),
            },
            Dispatcher::Generic(op) => {
                let Some(first) = self.gathered.first() else {
                    return Bounce::Failed(ActionError::EndOfFeed.into());
                };
                let tag = first.heart.tag();
                let Some(f) = ctx.generics().lookup(op, tag) else {
                    return Bounce::Failed(ActionError::GenericNotImplemented.into());
                };
                match f(ctx, &self.gathered) {
                    Ok(v) => {
                        level.output = v;
                        Bounce::Out
                    }
                    Err(e) => Bounce::Failed(e.into()),
                }
            }
            Dispatcher::Typechecker(typeset) => {
                let accepted = self
                    .gathered
                    .first()
                    .and_then(|c| ren_value::param::Typeset::bit_for(&c.heart).map(|bit| typeset.contains(bit)))
                    .unwrap_or(false);
                level.output = Cell::logic(accepted);
                Bounce::Out
            }
            Dispatcher::Specialized { inner, .. } => {
                let sub = ActionExecutor::already_gathered(inner, self.gathered.clone());
                Bounce::DelegateSublevel(Level::new(LevelId(0), Feed::from_cells(vec![]), Box::new(sub)))
            }
            Dispatcher::Cascade { steps } => {
                let sub = CascadeExecutor::<H>::new(steps, self.gathered.clone());
                Bounce::DelegateSublevel(Level::new(LevelId(0), Feed::from_cells(vec![]), Box::new(sub)))
            }
            Dispatcher::Interpreted { body, specifier } => {
                let frame = level.varlist.expect("frame built before dispatch");
                let use_id = ren_binding::make_use(ctx.pool_mut(), frame, specifier);
                ren_binding::bind_deep(ctx.pool_mut(), body, use_id);
                let sub = Level::new(LevelId(0), Feed::from_array(body), Box::new(EvaluatorExecutor::<H>::new()));
                Bounce::DelegateSublevel(sub)
            }
            Dispatcher::Adapt { prelude, inner } => {
                let frame = level.varlist.expect("frame built before dispatch");
                let use_id = ren_binding::make_use(ctx.pool_mut(), frame, None);
                ren_binding::bind_deep(ctx.pool_mut(), prelude, use_id);
                self.continuation = Some(Continuation::AdaptPrelude { inner });
                self.dispatch_stage = DispatchStage::AfterSub;
                let sub = Level::new(LevelId(0), Feed::from_array(prelude), Box::new(EvaluatorExecutor::<H>::new()));
                Bounce::ContinueSublevel(sub)
            }
            Dispatcher::Enclose { inner, outer } => {
                let frame = level.varlist.expect("frame built before dispatch");
                self.continuation = Some(Continuation::EncloseInner { outer, frame });
                self.dispatch_stage = DispatchStage::AfterSub;
                let sub = ActionExecutor::already_gathered(inner, self.gathered.clone());
                Bounce::ContinueSublevel(Level::new(LevelId(0), Feed::from_cells(vec![]), Box::new(sub)))
            }
            Dispatcher::Macro { body, specifier } => {
                let frame = level.varlist.expect("frame built before dispatch");
                let use_id = ren_binding::make_use(ctx.pool_mut(), frame, specifier);
                ren_binding::bind_deep(ctx.pool_mut(), body, use_id);
                self.continuation = Some(Continuation::MacroSplice);
                self.dispatch_stage = DispatchStage::AfterSub;
                let sub = Level::new(LevelId(0), Feed::from_array(body), Box::new(EvaluatorExecutor::<H>::new()));
                Bounce::ContinueSublevel(sub)
            }
        }
    }

    fn dispatch_after_sub(&mut self, level: &mut Level<H>, ctx: &mut H) -> Bounce<H> {
        match self.continuation.take() {
            Some(Continuation::MacroSplice) => match level.output.heart.clone() {
                Heart::Block(array) => {
                    let pool = ctx.pool();
                    let cells = pool.get(array).map(|s| s.content.as_cells().to_vec()).unwrap_or_default();
                    level.feed.borrow_mut().splice_front(pool, cells);
                    Bounce::Invisible
                }
                _ => Bounce::Failed(EvalError::message("macro body did not produce a block")),
            },
            Some(Continuation::AdaptPrelude { inner }) => {
                let frame = level.varlist.expect("frame built before dispatch");
                let pool = ctx.pool();
                let refreshed: Vec<Cell> = (0..self.gathered.len())
                    .map(|i| ren_value::context::varlist_slot(pool, frame, i).cloned().unwrap_or_else(|_| Cell::trash()))
                    .collect();
                let sub = ActionExecutor::already_gathered(inner, refreshed);
                Bounce::DelegateSublevel(Level::new(LevelId(0), Feed::from_cells(vec![]), Box::new(sub)))
            }
            Some(Continuation::EncloseInner { outer, frame }) => {
                let result = level.output.clone();
                let sub = ActionExecutor::already_gathered(outer, vec![Cell::context(ContextKind::Frame, frame), result]);
                Bounce::DelegateSublevel(Level::new(LevelId(0), Feed::from_cells(vec![]), Box::new(sub)))
            }
            None => Bounce::Failed(EvalError::message("action executor re-entered with no pending continuation")),
        }
    }
}

impl<H: ActionHost + 'static> Executor<H> for ActionExecutor<H> {
    fn step(&mut self, level: &mut Level<H>, ctx: &mut H) -> Bounce<H> {
        if !self.loaded {
            let pool = ctx.pool();
            match ren_value::paramlist::paramlist_params(pool, self.action.paramlist) {
                Ok(params) => self.params = params,
                Err(e) => return Bounce::Failed(EvalError::message(e.to_string())),
            }
            self.gathered = Vec::with_capacity(self.params.len());

            // A Specialized action's hidden params (§4.4) carry no call-site
            // syntax of their own; their values live in the exemplar frame,
            // aligned by index with this action's own Paramlist.
            let specialized_exemplar = match ctx.natives().get(self.action.details) {
                Ok(Dispatcher::Specialized { exemplar, .. }) => Some(*exemplar),
                _ => None,
            };
            if let Some(exemplar) = specialized_exemplar {
                for (i, p) in self.params.iter().enumerate() {
                    if p.is_hidden() {
                        if let Ok(value) = ren_value::context::varlist_slot(ctx.pool(), exemplar, i) {
                            self.prefill.insert(i, value.clone());
                        }
                    }
                }
            }

            self.loaded = true;
        }

        match self.phase {
            Phase::Gathering => self.step_gathering(level, ctx),
            Phase::AwaitingArg => self.step_awaiting_arg(level, ctx),
            Phase::Dispatching => match self.dispatch_stage {
                DispatchStage::Enter => self.dispatch_enter(level, ctx),
                DispatchStage::AfterSub => self.dispatch_after_sub(level, ctx),
            },
        }
    }
}

impl<H> std::fmt::Debug for ActionExecutor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("action", &self.action)
            .field("phase", &self.phase)
            .field("index", &self.index)
            .finish()
    }
}
