//! The generalized get/set primitive (§4.5): `tweak(location, picker,
//! incoming_dual)` walked one compiled [`crate::steps::Steps`] at a time,
//! with a writeback chain for containers that hand back a value by copy
//! (the inline `pair!` case — §4.1 notes a pair lives directly in a
//! Stub's content word, not behind its own StubId, so picking one of its
//! two components yields a copy that must be poked back into whatever
//! held the pair).
//!
//! Containers that hold things by reference (`object!`/`frame!`'s
//! Varlist, a `block!`'s Source array) never need writeback: poking
//! directly into the container is already visible to every other cell
//! that shares the same StubId, so the chain always terminates the
//! moment it reaches one (§4.5 "the loop terminates when a poke returns
//! a null writeback dual, meaning my container is updated in place").

use ren_value::context::{varlist_get, varlist_set, varlist_slot};
use ren_value::paramlist::find_param_index;
use ren_value::{Cell, Heart, StubPool};

use crate::dual::{Dual, Incoming};
use crate::error::TweakError;
use crate::steps::{Picker, RootRef, Steps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairWhich {
    First,
    Second,
}

#[derive(Debug, Clone)]
enum Frame {
    VarlistSlot { varlist: ren_value::StubId, index: usize },
    BlockIndex { array: ren_value::StubId, index: usize },
    /// Not itself writable — written back into whichever frame precedes
    /// it once the chain unwinds. `original` is the pair's two
    /// components as read, so the component *not* being replaced can be
    /// carried forward unchanged.
    PairComponent { which: PairWhich, original: (Cell, Cell) },
}

/// A failure attributed to a specific step in the chain — §4.5 "Errors"
/// distinguishes a final-step failure (definitional, caller may `try` it)
/// from an intermediate one (a genuinely broken reference, abrupt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub error: TweakError,
    pub is_final_step: bool,
}

fn root_value(pool: &StubPool, root: &RootRef) -> Result<Cell, TweakError> {
    match root {
        RootRef::Slot { varlist, index } => varlist_slot(pool, *varlist, *index).cloned().map_err(Into::into),
        RootRef::Value(v) => Ok(v.clone()),
    }
}

fn apply_picker(pool: &StubPool, current: &Cell, picker: &Picker) -> Result<(Cell, Frame), TweakError> {
    match (&current.heart, picker) {
        (Heart::Context(_, varlist), Picker::Symbol(sym)) => {
            let keylist = ren_value::context::varlist_keylist(pool, *varlist)?;
            let index = find_param_index(pool, keylist, *sym)?.ok_or(TweakError::NoSuchField("symbol"))?;
            let value = varlist_get(pool, *varlist, *sym)?.clone();
            Ok((value, Frame::VarlistSlot { varlist: *varlist, index }))
        }
        (Heart::Context(..), Picker::Index(_)) => Err(TweakError::NoSuchField("index-into-context")),
        (Heart::Pair(pair), Picker::Index(i)) => {
            let which = match i {
                1 => PairWhich::First,
                2 => PairWhich::Second,
                other => return Err(TweakError::IndexOutOfRange(*other)),
            };
            let original = (pair.0.clone(), pair.1.clone());
            let value = if which == PairWhich::First { original.0.clone() } else { original.1.clone() };
            Ok((value, Frame::PairComponent { which, original }))
        }
        (Heart::Pair(_), Picker::Symbol(_)) => Err(TweakError::NotAContext),
        (Heart::Block(array), Picker::Index(i)) => {
            let zero_based = i.checked_sub(1).ok_or(TweakError::IndexOutOfRange(*i))?;
            let cells = pool.get(*array)?.content.as_cells();
            let value = cells.get(zero_based).cloned().ok_or(TweakError::IndexOutOfRange(*i))?;
            Ok((value, Frame::BlockIndex { array: *array, index: zero_based }))
        }
        (Heart::Block(_), Picker::Symbol(_)) => Err(TweakError::NotAContext),
        _ => Err(TweakError::NotIndexable),
    }
}

fn walk(pool: &StubPool, steps: &Steps) -> Result<(Cell, Vec<Frame>), StepFailure> {
    let mut value = root_value(pool, &steps.root).map_err(|e| StepFailure {
        is_final_step: steps.pickers.is_empty(),
        error: e,
    })?;
    let mut frames = Vec::with_capacity(steps.pickers.len());
    if let RootRef::Slot { varlist, index } = steps.root {
        frames.push(Frame::VarlistSlot { varlist, index });
    }
    for (i, picker) in steps.pickers.iter().enumerate() {
        let is_final = i + 1 == steps.pickers.len();
        match apply_picker(pool, &value, picker) {
            Ok((next, frame)) => {
                value = next;
                frames.push(frame);
            }
            Err(e) => return Err(StepFailure { error: e, is_final_step: is_final }),
        }
    }
    Ok((value, frames))
}

/// `get(steps)`: walk the compiled path and return the value at its end,
/// lifted when `meta` requests it (§4.5 "Meta-access").
pub fn get(pool: &StubPool, steps: &Steps, meta: bool) -> Result<Dual, StepFailure> {
    let (value, _frames) = walk(pool, steps)?;
    Ok(Dual::Value(if meta { value.lift() } else { value }))
}

/// `set(steps, incoming)`: walk the same compiled path, then unwind the
/// writeback chain built along the way, applying `incoming` at the
/// innermost container reached (§4.5 "Writeback chain"). `incoming` is
/// unlifted before it is stored, mirroring the dual protocol's "a write
/// carries a lifted replacement" contract.
pub fn set(pool: &mut StubPool, steps: &Steps, incoming: Incoming) -> Result<(), StepFailure> {
    let Incoming::Poke(lifted) = incoming else {
        return Ok(());
    };
    let (_discarded_current, frames) = {
        let pool_ref: &StubPool = pool;
        walk(pool_ref, steps)?
    };
    let mut new_val = lifted.unlift();
    for frame in frames.into_iter().rev() {
        match frame {
            Frame::PairComponent { which, original } => {
                let (a, b) = original;
                new_val = match which {
                    PairWhich::First => Cell::pair(new_val, b),
                    PairWhich::Second => Cell::pair(a, new_val),
                };
            }
            Frame::VarlistSlot { varlist, index } => {
                let keylist = match ren_value::context::varlist_keylist(pool, varlist) {
                    Ok(k) => k,
                    Err(e) => return Err(StepFailure { error: e.into(), is_final_step: true }),
                };
                let params = match ren_value::paramlist::paramlist_params(pool, keylist) {
                    Ok(p) => p,
                    Err(e) => return Err(StepFailure { error: e.into(), is_final_step: true }),
                };
                let Some(symbol) = params.get(index).map(|p| p.symbol) else {
                    return Err(StepFailure {
                        error: TweakError::IndexOutOfRange(index),
                        is_final_step: true,
                    });
                };
                return varlist_set(pool, varlist, symbol, new_val)
                    .map_err(|e| StepFailure { error: e.into(), is_final_step: true });
            }
            Frame::BlockIndex { array, index } => {
                let stub = match pool.get_mut(array) {
                    Ok(s) => s,
                    Err(e) => return Err(StepFailure { error: e.into(), is_final_step: true }),
                };
                let cells = stub.content.as_cells_mut();
                let Some(slot) = cells.get_mut(index) else {
                    return Err(StepFailure {
                        error: TweakError::IndexOutOfRange(index),
                        is_final_step: true,
                    });
                };
                *slot = new_val;
                return Ok(());
            }
        }
    }
    Err(StepFailure {
        error: TweakError::NoSuchField("root value has no addressable container"),
        is_final_step: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ren_value::context::make_varlist;
    use ren_value::param::{ParamClass, Typeset};
    use ren_value::paramlist::make_paramlist;
    use ren_value::{ContextKind, ParamDescriptor, StubContent, StubFlavor};

    fn sym(pool: &mut StubPool, s: &[u8]) -> ren_value::StubId {
        pool.make_stub(StubFlavor::Symbol, StubContent::Bytes(s.to_vec()))
    }

    /// `obj: make object! [a: make object! [b: 1]]`; `obj.a.b: 10` then
    /// `get $obj.a.b` yields `10` (§8 scenario 4).
    #[test]
    fn nested_object_set_then_get_round_trips() {
        let mut pool = StubPool::new();
        let sym_b = sym(&mut pool, b"b");
        let inner_keylist = make_paramlist(&mut pool, Cell::trash(), vec![ParamDescriptor::new(sym_b, ParamClass::Normal, Typeset::ANY)]);
        let inner = make_varlist(&mut pool, ContextKind::Object, inner_keylist, vec![Cell::integer(1)]);

        let sym_a = sym(&mut pool, b"a");
        let outer_keylist = make_paramlist(&mut pool, Cell::trash(), vec![ParamDescriptor::new(sym_a, ParamClass::Normal, Typeset::ANY)]);
        let outer = make_varlist(&mut pool, ContextKind::Object, outer_keylist, vec![Cell::context(ContextKind::Object, inner)]);

        let steps = Steps::with_pickers(
            RootRef::Slot { varlist: outer, index: 0 },
            vec![Picker::Symbol(sym_b)],
        );

        set(&mut pool, &steps, Incoming::Poke(Cell::integer(10).lift())).unwrap();
        let fetched = get(&pool, &steps, false).unwrap();
        assert_eq!(fetched.into_plain(), Cell::integer(10));
    }

    #[test]
    fn poking_a_pair_component_writes_back_through_the_varlist_slot() {
        let mut pool = StubPool::new();
        let sym_p = sym(&mut pool, b"p");
        let keylist = make_paramlist(&mut pool, Cell::trash(), vec![ParamDescriptor::new(sym_p, ParamClass::Normal, Typeset::ANY)]);
        let obj = make_varlist(&mut pool, ContextKind::Object, keylist, vec![Cell::pair(Cell::integer(1), Cell::integer(2))]);

        let steps = Steps::with_pickers(RootRef::Slot { varlist: obj, index: 0 }, vec![Picker::Index(2)]);
        set(&mut pool, &steps, Incoming::Poke(Cell::integer(99).lift())).unwrap();

        let whole = varlist_slot(&pool, obj, 0).unwrap().clone();
        match whole.heart {
            Heart::Pair(p) => {
                assert_eq!(p.0, Cell::integer(1));
                assert_eq!(p.1, Cell::integer(99));
            }
            _ => panic!("expected pair"),
        }
    }

    #[test]
    fn getting_same_steps_twice_yields_equal_values() {
        let mut pool = StubPool::new();
        let sym_a = sym(&mut pool, b"a");
        let keylist = make_paramlist(&mut pool, Cell::trash(), vec![ParamDescriptor::new(sym_a, ParamClass::Normal, Typeset::ANY)]);
        let obj = make_varlist(&mut pool, ContextKind::Object, keylist, vec![Cell::integer(5)]);
        let steps = Steps::with_pickers(RootRef::Slot { varlist: obj, index: 0 }, vec![]);

        let first = get(&pool, &steps, false).unwrap().into_plain();
        let second = get(&pool, &steps, false).unwrap().into_plain();
        assert_eq!(first, second);
    }

    #[test]
    fn intermediate_step_failure_is_flagged_not_final() {
        let mut pool = StubPool::new();
        let sym_a = sym(&mut pool, b"a");
        let sym_missing = sym(&mut pool, b"missing");
        let keylist = make_paramlist(&mut pool, Cell::trash(), vec![ParamDescriptor::new(sym_a, ParamClass::Normal, Typeset::ANY)]);
        let obj = make_varlist(&mut pool, ContextKind::Object, keylist, vec![Cell::integer(1)]);

        let steps = Steps::with_pickers(
            RootRef::Slot { varlist: obj, index: 0 },
            vec![Picker::Symbol(sym_missing), Picker::Symbol(sym_a)],
        );
        let failure = get(&pool, &steps, false).unwrap_err();
        assert!(!failure.is_final_step);
    }
}
