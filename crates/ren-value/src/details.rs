//! The Details container (§3, §4.4): per-action private storage owned by
//! one Dispatcher. What each slot means is entirely up to the owning
//! Dispatcher; this module only provides the raw array.

use crate::cell::Cell;
use crate::error::ValueError;
use crate::pool::StubPool;
use crate::stub::{StubContent, StubFlavor, StubId};

pub fn make_details(pool: &mut StubPool, slots: Vec<Cell>) -> StubId {
    pool.make_stub(StubFlavor::Details, StubContent::Dynamic(slots))
}

pub fn details_slot<'a>(pool: &'a StubPool, id: StubId, index: usize) -> Result<&'a Cell, ValueError> {
    pool.get(id)?
        .content
        .as_cells()
        .get(index)
        .ok_or(ValueError::IndexOutOfBounds(index))
}

pub fn details_slot_mut(pool: &mut StubPool, id: StubId, index: usize) -> Result<&mut Cell, ValueError> {
    pool.get_mut(id)?
        .content
        .as_cells_mut()
        .get_mut(index)
        .ok_or(ValueError::IndexOutOfBounds(index))
}

pub fn details_len(pool: &StubPool, id: StubId) -> Result<usize, ValueError> {
    Ok(pool.get(id)?.content.as_cells().len())
}

pub fn details_replace(pool: &mut StubPool, id: StubId, slots: Vec<Cell>) -> Result<(), ValueError> {
    pool.get_mut(id)?.content = StubContent::Dynamic(slots);
    Ok(())
}
