//! The Stepper (§4.3 Executors, §4.4): advances the evaluator exactly one
//! value at a time. Self-evaluating hearts pass through unchanged; a bound
//! Word resolving to an action! pushes an [`ActionExecutor`] sub-Level to
//! dispatch it. [`EvaluatorExecutor`] drives a Stepper to the end of a
//! feed; [`MetaStepperExecutor`] wraps one step and lifts the result.

use std::marker::PhantomData;

use ren_trampoline::{Bounce, EvalError, Executor, Level, LevelId, Pending};
use ren_value::{Cell, CellFlags, Heart};

use crate::action_executor::ActionExecutor;
use crate::host::ActionHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    AfterDispatch,
    AfterInfixRetrigger,
}

/// One evaluator step, possibly spanning several Trampoline bounces when
/// the cell read turns out to be a Word bound to an action!. `tight`
/// suppresses the defer-to-infix retrigger this step would otherwise run
/// on its own result (§4.4 "Tight" parameter class).
#[derive(Debug)]
pub struct StepperExecutor<H> {
    tight: bool,
    phase: Phase,
    _marker: PhantomData<fn() -> H>,
}

impl<H: ActionHost + 'static> StepperExecutor<H> {
    pub fn new() -> Self {
        Self {
            tight: false,
            phase: Phase::Start,
            _marker: PhantomData,
        }
    }

    pub fn tight() -> Self {
        Self {
            tight: true,
            phase: Phase::Start,
            _marker: PhantomData,
        }
    }

    /// After producing a value, check whether the next feed cell is an
    /// infix action and, if so, retrigger it with that value as its first
    /// argument (§4.4 "Defer-to-infix first argument"). Returns `None`
    /// when no retrigger applies, leaving `level.output` as the plain
    /// result.
    fn maybe_infix_retrigger(&mut self, level: &mut Level<H>, ctx: &mut H) -> Option<Bounce<H>> {
        if self.tight {
            return None;
        }
        let action_ref = {
            let pool = ctx.pool();
            let peeked = level.feed.borrow().peek(pool)?;
            let Heart::Word(word) = peeked.heart else {
                return None;
            };
            let binding = word.binding?;
            let (varlist, idx) = ren_binding::resolve(pool, binding, word.spelling).ok()?;
            let value = ren_value::context::varlist_slot(pool, varlist, idx).ok()?.clone();
            match value.heart {
                Heart::Action(action_ref) => action_ref,
                _ => return None,
            }
        };
        let pool = ctx.pool();
        let archetype = ren_value::paramlist::paramlist_archetype(pool, action_ref.paramlist).ok()?;
        if !archetype.flags.contains(CellFlags::INFIX) {
            return None;
        }
        let params = ren_value::paramlist::paramlist_params(pool, action_ref.paramlist).ok()?;
        if let Some(first) = params
            .iter()
            .find(|p| !p.is_hidden() && !matches!(p.class, ren_value::param::ParamClass::Local | ren_value::param::ParamClass::Return))
        {
            if first.defers_lookback() {
                return None;
            }
        }
        // Consume the word cell we only peeked at above.
        level.feed.borrow_mut().next(pool);
        let lhs = level.output.clone();
        self.phase = Phase::AfterInfixRetrigger;
        let exec = ActionExecutor::new(action_ref).with_prefill(0, lhs);
        let sub = Level::new_sharing(LevelId(0), level, Box::new(exec));
        Some(Bounce::ContinueSublevel(sub))
    }
}

impl<H: ActionHost + 'static> Default for StepperExecutor<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ActionHost + 'static> Executor<H> for StepperExecutor<H> {
    fn step(&mut self, level: &mut Level<H>, ctx: &mut H) -> Bounce<H> {
        match self.phase {
            Phase::Start => {
                if let Some(Pending::Throw(throw)) = level.take_pending() {
                    return Bounce::Thrown(throw);
                }
                let cell = {
                    let pool = ctx.pool();
                    level.feed.borrow_mut().next(pool)
                };
                let Some(cell) = cell else {
                    level.output = Cell::void();
                    return Bounce::Out;
                };
                if let Heart::Word(word) = &cell.heart {
                    let Some(binding) = word.binding else {
                        return Bounce::Failed(EvalError::message("word is unbound"));
                    };
                    let pool = ctx.pool();
                    let resolved = ren_binding::resolve(pool, binding, word.spelling)
                        .ok()
                        .and_then(|(varlist, idx)| {
                            ren_value::context::varlist_slot(pool, varlist, idx).ok().cloned()
                        });
                    let Some(value) = resolved else {
                        return Bounce::Failed(EvalError::message("word is unbound"));
                    };
                    if let Heart::Action(action_ref) = value.heart {
                        self.phase = Phase::AfterDispatch;
                        let exec = ActionExecutor::new(action_ref);
                        let sub = Level::new_sharing(LevelId(0), level, Box::new(exec));
                        return Bounce::ContinueSublevel(sub);
                    }
                    level.output = value;
                } else {
                    level.output = cell;
                }
                if let Some(bounce) = self.maybe_infix_retrigger(level, ctx) {
                    return bounce;
                }
                Bounce::Out
            }
            Phase::AfterDispatch => {
                if let Some(bounce) = self.maybe_infix_retrigger(level, ctx) {
                    return bounce;
                }
                Bounce::Out
            }
            Phase::AfterInfixRetrigger => Bounce::Out,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvalPhase {
    Stepping,
    AfterStep,
}

/// Drives a Stepper to the end of its feed, keeping the last
/// non-invisible result — the behavior a block evaluates with (§4.3
/// "Evaluator" in the Executors list).
#[derive(Debug)]
pub struct EvaluatorExecutor<H> {
    last: Cell,
    phase: EvalPhase,
    _marker: PhantomData<fn() -> H>,
}

impl<H: ActionHost + 'static> EvaluatorExecutor<H> {
    pub fn new() -> Self {
        Self {
            last: Cell::void(),
            phase: EvalPhase::Stepping,
            _marker: PhantomData,
        }
    }
}

impl<H: ActionHost + 'static> Default for EvaluatorExecutor<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ActionHost + 'static> Executor<H> for EvaluatorExecutor<H> {
    fn step(&mut self, level: &mut Level<H>, ctx: &mut H) -> Bounce<H> {
        match self.phase {
            EvalPhase::Stepping => {
                if let Some(Pending::Throw(throw)) = level.take_pending() {
                    return Bounce::Thrown(throw);
                }
                let at_end = {
                    let pool = ctx.pool();
                    level.feed.borrow().is_end(pool)
                };
                if at_end {
                    level.output = self.last.clone();
                    return Bounce::Out;
                }
                self.phase = EvalPhase::AfterStep;
                let sub = Level::new_sharing(LevelId(0), level, Box::new(StepperExecutor::<H>::new()));
                Bounce::ContinueSublevel(sub)
            }
            EvalPhase::AfterStep => {
                if !matches!(level.output.heart, Heart::Void) {
                    self.last = level.output.clone();
                }
                self.phase = EvalPhase::Stepping;
                Bounce::RedoUnchecked
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaPhase {
    Start,
    AfterStep,
}

/// Wraps exactly one Stepper step and lifts its result (§3 "meta"
/// operations: `^value`/`meta-of` read an otherwise-invisible antiform by
/// quasi-wrapping it).
#[derive(Debug)]
pub struct MetaStepperExecutor<H> {
    phase: MetaPhase,
    _marker: PhantomData<fn() -> H>,
}

impl<H: ActionHost + 'static> MetaStepperExecutor<H> {
    pub fn new() -> Self {
        Self {
            phase: MetaPhase::Start,
            _marker: PhantomData,
        }
    }
}

impl<H: ActionHost + 'static> Default for MetaStepperExecutor<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ActionHost + 'static> Executor<H> for MetaStepperExecutor<H> {
    fn step(&mut self, level: &mut Level<H>, ctx: &mut H) -> Bounce<H> {
        match self.phase {
            MetaPhase::Start => {
                self.phase = MetaPhase::AfterStep;
                let sub = Level::new_sharing(LevelId(0), level, Box::new(StepperExecutor::<H>::new()));
                Bounce::ContinueSublevel(sub)
            }
            MetaPhase::AfterStep => {
                level.output = level.output.clone().lift();
                Bounce::Out
            }
        }
    }
}
