//! The Paramlist container (§3, §4.4): an ordered list of parameter
//! descriptor cells, with position 0 reserved as an archetype cell (an
//! Action archetype for a true action's parameter list, a placeholder
//! Trash cell when a Paramlist is reused as an object/module's keylist).

use crate::cell::Cell;
use crate::error::ValueError;
use crate::heart::Heart;
use crate::param::ParamDescriptor;
use crate::pool::StubPool;
use crate::stub::{StubContent, StubFlavor, StubId};

pub fn make_paramlist(
    pool: &mut StubPool,
    archetype: Cell,
    params: Vec<ParamDescriptor>,
) -> StubId {
    let mut cells = Vec::with_capacity(params.len() + 1);
    cells.push(archetype);
    cells.extend(params.into_iter().map(|p| Cell::fundamental(Heart::Param(p))));
    pool.make_stub(StubFlavor::Paramlist, StubContent::Dynamic(cells))
}

pub fn paramlist_archetype(pool: &StubPool, id: StubId) -> Result<&Cell, ValueError> {
    pool.get(id)?
        .content
        .as_cells()
        .first()
        .ok_or(ValueError::IndexOutOfBounds(0))
}

/// Parameter descriptors in declaration order (excludes the archetype at
/// position 0).
pub fn paramlist_params(pool: &StubPool, id: StubId) -> Result<Vec<ParamDescriptor>, ValueError> {
    let cells = pool.get(id)?.content.as_cells();
    Ok(cells
        .iter()
        .skip(1)
        .filter_map(|c| match &c.heart {
            Heart::Param(p) => Some(*p),
            _ => None,
        })
        .collect())
}

pub fn paramlist_len(pool: &StubPool, id: StubId) -> Result<usize, ValueError> {
    Ok(pool.get(id)?.content.as_cells().len().saturating_sub(1))
}

/// Find a parameter's 0-based position (excluding the archetype) by
/// symbol identity. Symbol equality is by `StubId` — canon-interned
/// symbols compare equal by identity (§4.6, §8).
pub fn find_param_index(
    pool: &StubPool,
    id: StubId,
    symbol: StubId,
) -> Result<Option<usize>, ValueError> {
    Ok(paramlist_params(pool, id)?
        .iter()
        .position(|p| p.symbol == symbol))
}
