//! The Varlist container (§3, §4.6): an ordered mapping from keys
//! (Symbols, shared via a keylist Paramlist) to Cell slots. A Varlist's
//! position 0 is a self-archetype cell whose heart is `Context(kind, _)`.

use crate::cell::Cell;
use crate::error::ValueError;
use crate::heart::{ContextKind, Heart};
use crate::param::ParamDescriptor;
use crate::paramlist::find_param_index;
use crate::pool::StubPool;
use crate::stub::{StubContent, StubFlavor, StubId};

/// Allocate a Varlist with `keylist` as its `link` slot. `slots` must be
/// the same length as the keylist's parameter count; the archetype is
/// synthesized and written back once the Varlist's own id is known, so
/// the archetype can self-reference its Varlist.
pub fn make_varlist(
    pool: &mut StubPool,
    kind: ContextKind,
    keylist: StubId,
    slots: Vec<Cell>,
) -> StubId {
    let mut cells = Vec::with_capacity(slots.len() + 1);
    cells.push(Cell::trash()); // placeholder, overwritten below
    cells.extend(slots);
    let id = pool.make_stub(StubFlavor::Varlist, StubContent::Dynamic(cells));
    if let Ok(stub) = pool.get_mut(id) {
        stub.link = Some(keylist);
        if let Some(archetype_slot) = stub.content.as_cells_mut().first_mut() {
            *archetype_slot = Cell::context(kind, id);
        }
    }
    id
}

pub fn varlist_keylist(pool: &StubPool, id: StubId) -> Result<StubId, ValueError> {
    pool.get(id)?.link.ok_or(ValueError::IndexOutOfBounds(0))
}

pub fn varlist_archetype(pool: &StubPool, id: StubId) -> Result<&Cell, ValueError> {
    pool.get(id)?
        .content
        .as_cells()
        .first()
        .ok_or(ValueError::IndexOutOfBounds(0))
}

pub fn varlist_kind(pool: &StubPool, id: StubId) -> Result<ContextKind, ValueError> {
    match &varlist_archetype(pool, id)?.heart {
        Heart::Context(kind, _) => Ok(*kind),
        _ => Err(ValueError::IndexOutOfBounds(0)),
    }
}

pub fn varlist_len(pool: &StubPool, id: StubId) -> Result<usize, ValueError> {
    Ok(pool.get(id)?.content.as_cells().len().saturating_sub(1))
}

/// Slot at 1-based position `index` (0 is the archetype and not
/// reachable through this accessor — use [`varlist_archetype`]).
pub fn varlist_slot<'a>(pool: &'a StubPool, id: StubId, index: usize) -> Result<&'a Cell, ValueError> {
    pool.get(id)?
        .content
        .as_cells()
        .get(index + 1)
        .ok_or(ValueError::IndexOutOfBounds(index))
}

pub fn varlist_slot_mut(pool: &mut StubPool, id: StubId, index: usize) -> Result<&mut Cell, ValueError> {
    pool.get_mut(id)?
        .content
        .as_cells_mut()
        .get_mut(index + 1)
        .ok_or(ValueError::IndexOutOfBounds(index))
}

/// Resolve a symbol to its slot index within this Varlist via its
/// keylist, then return the slot itself.
pub fn varlist_get<'a>(pool: &'a StubPool, id: StubId, symbol: StubId) -> Result<&'a Cell, ValueError> {
    let keylist = varlist_keylist(pool, id)?;
    let index = find_param_index(pool, keylist, symbol)?.ok_or(ValueError::IndexOutOfBounds(0))?;
    varlist_slot(pool, id, index)
}

pub fn varlist_set(pool: &mut StubPool, id: StubId, symbol: StubId, value: Cell) -> Result<(), ValueError> {
    let keylist = varlist_keylist(pool, id)?;
    let index = find_param_index(pool, keylist, symbol)?.ok_or(ValueError::IndexOutOfBounds(0))?;
    *varlist_slot_mut(pool, id, index)? = value;
    Ok(())
}

pub fn varlist_keys(pool: &StubPool, id: StubId) -> Result<Vec<ParamDescriptor>, ValueError> {
    let keylist = varlist_keylist(pool, id)?;
    crate::paramlist::paramlist_params(pool, keylist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{ParamClass, Typeset};
    use crate::paramlist::make_paramlist;
    use crate::stub::{StubContent, StubFlavor};

    #[test]
    fn get_and_set_round_trip_through_keylist() {
        let mut pool = StubPool::new();
        let sym_a = pool.make_stub(StubFlavor::Symbol, StubContent::Bytes(b"a".to_vec()));
        let sym_b = pool.make_stub(StubFlavor::Symbol, StubContent::Bytes(b"b".to_vec()));
        let keylist = make_paramlist(
            &mut pool,
            Cell::trash(),
            vec![
                ParamDescriptor::new(sym_a, ParamClass::Normal, Typeset::ANY),
                ParamDescriptor::new(sym_b, ParamClass::Normal, Typeset::ANY),
            ],
        );
        let obj = make_varlist(
            &mut pool,
            ContextKind::Object,
            keylist,
            vec![Cell::integer(1), Cell::integer(2)],
        );

        assert_eq!(varlist_get(&pool, obj, sym_b).unwrap(), &Cell::integer(2));
        varlist_set(&mut pool, obj, sym_a, Cell::integer(99)).unwrap();
        assert_eq!(varlist_get(&pool, obj, sym_a).unwrap(), &Cell::integer(99));
        assert_eq!(varlist_kind(&pool, obj).unwrap(), ContextKind::Object);
    }
}
