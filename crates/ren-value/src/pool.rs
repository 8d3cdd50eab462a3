//! The Stub pool: a segment-of-units free-list allocator (§4.1). A unit
//! is recognized as free by occupying a [`Slot::Free`] variant rather than
//! the original's sentinel-byte trick — the "Arenas + indices, not raw
//! pointers" Design Note replaces the pointer-discrimination contract with
//! a generation-checked [`StubId`], so a stale handle is a typed error
//! instead of undefined behavior.

use tracing::trace;

use crate::error::ValueError;
use crate::stub::{Stub, StubContent, StubFlavor, StubId};

enum Slot {
    Free { next_free: Option<u32>, generation: u32 },
    Occupied { stub: Stub, generation: u32 },
}

/// The primary pool: every live [`Stub`] in the interpreter lives here,
/// addressed by [`StubId`]. `make_stub` is the pool's equivalent of the
/// source's `make_stub(flavor, flags)`.
pub struct StubPool {
    slots: Vec<Slot>,
    free_head: Option<u32>,
    live_count: usize,
    /// Backdoor byte allocations tracked so `repossess` can turn one into
    /// a Binary value and `free_bytes` can release it directly, mirroring
    /// `alloc_bytes`/`free_bytes`/`repossess` in §4.1/§6.
    raw_allocations: usize,
}

impl Default for StubPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StubPool {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live_count: 0,
            raw_allocations: 0,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// `make_stub(flavor, flags)`: returns an unmanaged Stub with an
    /// initialized header. Promotion to managed is explicit via
    /// [`Self::manage`] (§3 lifecycle).
    pub fn make_stub(&mut self, flavor: StubFlavor, content: StubContent) -> StubId {
        let stub = Stub::new(flavor, content);
        let id = if let Some(free) = self.free_head {
            let (next_free, generation) = match &self.slots[free as usize] {
                Slot::Free { next_free, generation } => (*next_free, *generation + 1),
                Slot::Occupied { .. } => unreachable!("free list points at occupied slot"),
            };
            self.free_head = next_free;
            self.slots[free as usize] = Slot::Occupied { stub, generation };
            StubId { index: free, generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot::Occupied { stub, generation: 0 });
            StubId { index, generation: 0 }
        };
        self.live_count += 1;
        trace!(target: "gc.pool", index = id.index, flavor = ?flavor, "make_stub");
        id
    }

    pub fn get(&self, id: StubId) -> Result<&Stub, ValueError> {
        match self.slots.get(id.index as usize) {
            Some(Slot::Occupied { stub, generation }) if *generation == id.generation => Ok(stub),
            Some(_) => Err(ValueError::Stale(id)),
            None => Err(ValueError::OutOfRange(id)),
        }
    }

    pub fn get_mut(&mut self, id: StubId) -> Result<&mut Stub, ValueError> {
        match self.slots.get_mut(id.index as usize) {
            Some(Slot::Occupied { stub, generation }) if *generation == id.generation => Ok(stub),
            Some(_) => Err(ValueError::Stale(id)),
            None => Err(ValueError::OutOfRange(id)),
        }
    }

    pub fn is_live(&self, id: StubId) -> bool {
        matches!(
            self.slots.get(id.index as usize),
            Some(Slot::Occupied { generation, .. }) if *generation == id.generation
        )
    }

    pub fn manage(&mut self, id: StubId) -> Result<(), ValueError> {
        self.get_mut(id)?.leader.insert(crate::stub::StubLeader::MANAGED);
        Ok(())
    }

    pub fn unmanage(&mut self, id: StubId) -> Result<(), ValueError> {
        self.get_mut(id)?.leader.remove(crate::stub::StubLeader::MANAGED);
        Ok(())
    }

    /// Free an unmanaged stub directly (§3: "Unmanaged Stubs die through
    /// explicit free or by GC"). Freeing a managed stub this way is a
    /// programmer error — the GC owns managed-stub lifetime.
    pub fn free(&mut self, id: StubId) -> Result<(), ValueError> {
        let occupied_generation = match self.slots.get(id.index as usize) {
            Some(Slot::Occupied { stub, generation }) if *generation == id.generation => {
                if stub.is_managed() {
                    return Err(ValueError::FreeOfManaged(id));
                }
                *generation
            }
            Some(_) => return Err(ValueError::Stale(id)),
            None => return Err(ValueError::OutOfRange(id)),
        };
        self.slots[id.index as usize] = Slot::Free {
            next_free: self.free_head,
            generation: occupied_generation,
        };
        self.free_head = Some(id.index);
        self.live_count -= 1;
        Ok(())
    }

    /// Iterate all occupied slots for the GC sweep (§4.2). Returns
    /// `(StubId, &mut Stub)` pairs; the sweep decides fate per slot.
    pub fn occupied_ids(&self) -> Vec<StubId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match s {
                Slot::Occupied { generation, .. } => Some(StubId {
                    index: i as u32,
                    generation: *generation,
                }),
                Slot::Free { .. } => None,
            })
            .collect()
    }

    /// `alloc_bytes(size)`: a raw buffer backed by an unmanaged Binary
    /// stub. The returned id can be turned into a real value later via
    /// [`Self::repossess`], or released with [`Self::free_bytes`] without
    /// ever promoting it to a Cell.
    pub fn alloc_bytes(&mut self, size: usize) -> StubId {
        self.raw_allocations += 1;
        self.make_stub(StubFlavor::Binary, StubContent::Bytes(vec![0u8; size]))
    }

    pub fn free_bytes(&mut self, id: StubId) -> Result<(), ValueError> {
        self.raw_allocations = self.raw_allocations.saturating_sub(1);
        self.free(id)
    }

    /// `repossess(ptr, size)`: reinterpret a raw byte allocation as a
    /// proper Binary value by truncating/padding its buffer to `size` and
    /// leaving it in place (still unmanaged, ready for `manage`).
    pub fn repossess(&mut self, id: StubId, size: usize) -> Result<StubId, ValueError> {
        let stub = self.get_mut(id)?;
        match &mut stub.content {
            StubContent::Bytes(buf) => {
                buf.resize(size, 0);
                Ok(id)
            }
            _ => Err(ValueError::NotRawBytes(id)),
        }
    }

    pub fn raw_allocation_count(&self) -> usize {
        self.raw_allocations
    }

    /// Free a stub regardless of its managed flag. Reserved for the
    /// collector's sweep phase (§4.2) — nothing else should bypass the
    /// managed-stub protection that [`Self::free`] enforces.
    pub fn force_free(&mut self, id: StubId) -> Result<(), ValueError> {
        let generation = match self.slots.get(id.index as usize) {
            Some(Slot::Occupied { generation, .. }) => *generation,
            Some(Slot::Free { .. }) => return Err(ValueError::Stale(id)),
            None => return Err(ValueError::OutOfRange(id)),
        };
        if generation != id.generation {
            return Err(ValueError::Stale(id));
        }
        self.slots[id.index as usize] = Slot::Free {
            next_free: self.free_head,
            generation,
        };
        self.free_head = Some(id.index);
        self.live_count -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_and_free_recycles_slot_with_bumped_generation() {
        let mut pool = StubPool::new();
        let a = pool.make_stub(StubFlavor::Source, StubContent::Dynamic(vec![]));
        pool.free(a).unwrap();
        let b = pool.make_stub(StubFlavor::Source, StubContent::Dynamic(vec![]));
        assert_eq!(a.index, b.index);
        assert_ne!(a.generation, b.generation);
        assert!(matches!(pool.get(a), Err(ValueError::Stale(_))));
        assert!(pool.get(b).is_ok());
    }

    #[test]
    fn repossess_round_trips_length_and_bytes() {
        let mut pool = StubPool::new();
        let id = pool.alloc_bytes(4);
        {
            let stub = pool.get_mut(id).unwrap();
            if let StubContent::Bytes(buf) = &mut stub.content {
                buf.copy_from_slice(&[1, 2, 3, 4]);
            }
        }
        let repossessed = pool.repossess(id, 4).unwrap();
        let stub = pool.get(repossessed).unwrap();
        assert_eq!(stub.content.as_bytes(), Some([1u8, 2, 3, 4].as_slice()));
    }

    #[test]
    fn free_of_managed_stub_is_rejected() {
        let mut pool = StubPool::new();
        let id = pool.make_stub(StubFlavor::Source, StubContent::Dynamic(vec![]));
        pool.manage(id).unwrap();
        assert!(matches!(pool.free(id), Err(ValueError::FreeOfManaged(_))));
    }
}
