//! Symbol interning (§4.6, §8): equal spellings share one Stub, so
//! comparing two symbols for equality is a pointer (here, `StubId`)
//! comparison.

use std::collections::HashMap;

use tracing::trace;

use ren_value::{StubContent, StubFlavor, StubId, StubPool};

#[derive(Default)]
pub struct Canon {
    table: HashMap<Vec<u8>, StubId>,
}

impl Canon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interning a fresh buffer with spelling already in the table
    /// returns the same Stub id every time (§8 testable property).
    pub fn intern(&mut self, pool: &mut StubPool, spelling: &[u8]) -> StubId {
        if let Some(&id) = self.table.get(spelling) {
            return id;
        }
        let id = pool.make_stub(StubFlavor::Symbol, StubContent::Bytes(spelling.to_vec()));
        let _ = pool.manage(id);
        trace!(target: "binding.canon", bytes = ?String::from_utf8_lossy(spelling), "intern");
        self.table.insert(spelling.to_vec(), id);
        id
    }

    pub fn lookup(&self, spelling: &[u8]) -> Option<StubId> {
        self.table.get(spelling).copied()
    }

    /// Every interned Symbol, contributed as a GC root (§4.2 root #6) —
    /// Symbols are process-wide and must survive any collection.
    pub fn roots(&self) -> Vec<StubId> {
        self.table.values().copied().collect()
    }

    pub fn spelling_of<'a>(&self, pool: &'a StubPool, id: StubId) -> Option<&'a [u8]> {
        pool.get(id).ok()?.content.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_bytes_twice_returns_same_id() {
        let mut pool = StubPool::new();
        let mut canon = Canon::new();
        let a = canon.intern(&mut pool, b"foo");
        let b = canon.intern(&mut pool, b"foo");
        assert_eq!(a, b);
        let c = canon.intern(&mut pool, b"bar");
        assert_ne!(a, c);
    }
}
