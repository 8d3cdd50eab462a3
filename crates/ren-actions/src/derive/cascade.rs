//! The Cascader (a.k.a. chain) derivation (§4.4): a pipeline of actions
//! where the cascade's own Paramlist equals its first step's, and each
//! subsequent step is fed the previous step's result as its sole
//! argument — "as if an infix application".
//!
//! §9's Open Questions flag the arity of downstream steps as unsettled
//! in the source ("interesting — might be bugs waiting to happen"). This
//! executor takes the conservative reading: every step after the first
//! must accept exactly one non-local, non-refinement argument. A step
//! with a wider Paramlist fails abruptly rather than silently leaving
//! later parameters unset (see DESIGN.md).

use std::marker::PhantomData;

use ren_trampoline::{Bounce, EvalError, Executor, Feed, Level, LevelId};
use ren_value::Cell;
use ren_value::heart::ActionRef;

use crate::action_executor::ActionExecutor;
use crate::host::ActionHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Enter,
    AfterStep,
}

#[derive(Debug)]
pub struct CascadeExecutor<H> {
    steps: Vec<ActionRef>,
    index: usize,
    next_args: Vec<Cell>,
    phase: Phase,
    _marker: PhantomData<fn() -> H>,
}

impl<H: ActionHost + 'static> CascadeExecutor<H> {
    /// `first_args` are the cascade action's own fulfilled arguments,
    /// already gathered against `steps[0]`'s Paramlist by the outer
    /// `ActionExecutor` since a cascade shares its first step's
    /// Paramlist verbatim.
    pub fn new(steps: Vec<ActionRef>, first_args: Vec<Cell>) -> Self {
        Self {
            steps,
            index: 0,
            next_args: first_args,
            phase: Phase::Enter,
            _marker: PhantomData,
        }
    }

    fn run_current_step(&mut self) -> Bounce<H> {
        let action = self.steps[self.index];
        let args = std::mem::take(&mut self.next_args);
        let is_last = self.index + 1 == self.steps.len();
        let sub = ActionExecutor::already_gathered(action, args);
        let sub_level = Level::new(LevelId(0), Feed::from_cells(vec![]), Box::new(sub));
        if is_last {
            // The final step's result is the cascade's own result; no
            // further re-entry of this executor is needed.
            Bounce::DelegateSublevel(sub_level)
        } else {
            self.phase = Phase::AfterStep;
            Bounce::ContinueSublevel(sub_level)
        }
    }
}

impl<H: ActionHost + 'static> Executor<H> for CascadeExecutor<H> {
    fn step(&mut self, level: &mut Level<H>, _ctx: &mut H) -> Bounce<H> {
        match self.phase {
            Phase::Enter => {
                if self.steps.is_empty() {
                    return Bounce::Failed(EvalError::message("cascade with no steps"));
                }
                self.run_current_step()
            }
            Phase::AfterStep => {
                self.index += 1;
                self.next_args = vec![level.output.clone()];
                self.phase = Phase::Enter;
                self.run_current_step()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ren_trampoline::Trampoline;
    use ren_value::param::{ParamClass, Typeset};
    use ren_value::{Cell, ParamDescriptor};

    use crate::dispatcher::{Dispatcher, NativeTable};
    use crate::generic::GenericTable;
    use ren_gc::{Gc, GuardHandle};
    use ren_value::StubPool;

    struct Host {
        pool: StubPool,
        natives: NativeTable<Host>,
        generics: GenericTable<Host>,
        gc: Gc,
    }

    impl ActionHost for Host {
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
        fn guard(&mut self, id: ren_value::StubId) -> GuardHandle {
            self.gc.guard_stack().guard(id)
        }
    }

    fn add_two(_: &mut Host, args: &[Cell]) -> Result<Cell, crate::error::ActionError> {
        let (Some(a), Some(b)) = (args.first(), args.get(1)) else {
            return Err(crate::error::ActionError::EndOfFeed);
        };
        match (&a.heart, &b.heart) {
            (ren_value::Heart::Integer(x), ren_value::Heart::Integer(y)) => Ok(Cell::integer(x + y)),
            _ => Err(crate::error::ActionError::TypeMismatch),
        }
    }

    fn negate_one(_: &mut Host, args: &[Cell]) -> Result<Cell, crate::error::ActionError> {
        match args.first().map(|c| &c.heart) {
            Some(ren_value::Heart::Integer(x)) => Ok(Cell::integer(-x)),
            _ => Err(crate::error::ActionError::TypeMismatch),
        }
    }

    /// `negadd: cascade [:add :negate]; negadd 2 2` returns `-4` (§8
    /// scenario 1).
    #[test]
    fn cascade_of_add_then_negate_returns_negative_sum() {
        let mut pool = StubPool::new();
        let sym = |pool: &mut StubPool, s: &[u8]| {
            pool.make_stub(ren_value::StubFlavor::Symbol, ren_value::StubContent::Bytes(s.to_vec()))
        };
        let sym_a = sym(&mut pool, b"a");
        let sym_b = sym(&mut pool, b"b");
        let add_paramlist = ren_value::paramlist::make_paramlist(
            &mut pool,
            Cell::trash(),
            vec![
                ParamDescriptor::new(sym_a, ParamClass::Normal, Typeset::ANY),
                ParamDescriptor::new(sym_b, ParamClass::Normal, Typeset::ANY),
            ],
        );
        let sym_x = sym(&mut pool, b"x");
        let negate_paramlist = ren_value::paramlist::make_paramlist(
            &mut pool,
            Cell::trash(),
            vec![ParamDescriptor::new(sym_x, ParamClass::Normal, Typeset::ANY)],
        );
        let add_details = pool.make_stub(ren_value::StubFlavor::Details, ren_value::StubContent::Dynamic(vec![]));
        let negate_details = pool.make_stub(ren_value::StubFlavor::Details, ren_value::StubContent::Dynamic(vec![]));

        let mut natives = NativeTable::new();
        natives.register(add_details, Dispatcher::RawNative(add_two));
        natives.register(negate_details, Dispatcher::RawNative(negate_one));

        let add_ref = ActionRef { paramlist: add_paramlist, details: add_details };
        let negate_ref = ActionRef { paramlist: negate_paramlist, details: negate_details };

        let mut host = Host {
            pool,
            natives,
            generics: GenericTable::new(),
            gc: Gc::new(),
        };

        let mut tramp: Trampoline<Host> = Trampoline::new();
        let exec = CascadeExecutor::<Host>::new(vec![add_ref, negate_ref], vec![Cell::integer(2), Cell::integer(2)]);
        tramp.push_level(Feed::from_cells(vec![]), Box::new(exec));
        let result = tramp.run(&mut host).unwrap();
        assert_eq!(result, Cell::integer(-4));
    }
}
