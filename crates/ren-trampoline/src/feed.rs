//! [`Feed`]: the stream of cells a Level consumes while evaluating (§3,
//! §4.3). A Feed is backed either by a Source array (the common case) or
//! by an in-memory reified buffer — the shape the GC's variadic
//! reification (§4.2) and a Macro/Inliner splice (§4.4) both produce.

use ren_value::{Cell, StubId, StubPool};

#[derive(Debug, Clone)]
enum Backing {
    /// Cursor into a Source-flavor Stub. `index` is the position of the
    /// next cell to be consumed.
    Array { array: StubId, index: usize },
    /// A freestanding buffer: produced by reification of a varargs stream
    /// that cannot be replayed, or by splicing a macro's result in front
    /// of whatever cells remain.
    Reified(Vec<Cell>),
}

#[derive(Debug, Clone)]
pub struct Feed {
    backing: Backing,
}

impl Feed {
    pub fn from_array(array: StubId) -> Self {
        Self {
            backing: Backing::Array { array, index: 0 },
        }
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self {
            backing: Backing::Reified(cells),
        }
    }

    pub fn is_end(&self, pool: &StubPool) -> bool {
        match &self.backing {
            Backing::Array { array, index } => pool
                .get(*array)
                .map(|s| *index >= s.content.as_cells().len())
                .unwrap_or(true),
            Backing::Reified(cells) => cells.is_empty(),
        }
    }

    pub fn peek(&self, pool: &StubPool) -> Option<Cell> {
        match &self.backing {
            Backing::Array { array, index } => {
                pool.get(*array).ok()?.content.as_cells().get(*index).cloned()
            }
            Backing::Reified(cells) => cells.first().cloned(),
        }
    }

    /// Consume and return the next cell, or `None` at end-of-feed.
    pub fn next(&mut self, pool: &StubPool) -> Option<Cell> {
        match &mut self.backing {
            Backing::Array { array, index } => {
                let cells = pool.get(*array).ok()?.content.as_cells();
                let cell = cells.get(*index).cloned();
                if cell.is_some() {
                    *index += 1;
                }
                cell
            }
            Backing::Reified(cells) => {
                if cells.is_empty() {
                    None
                } else {
                    Some(cells.remove(0))
                }
            }
        }
    }

    /// Rewrite this Feed to a Reified buffer holding every cell not yet
    /// consumed. The GC calls this on every Level before marking begins,
    /// because a varargs-backed stream cannot be replayed once control
    /// returns to the C (here: Rust) caller that owns it (§4.2 "Variadic
    /// reification"). Idempotent on an already-Reified feed.
    pub fn reify(&mut self, pool: &StubPool) {
        if let Backing::Array { array, index } = &self.backing {
            let remaining = pool
                .get(*array)
                .map(|s| s.content.as_cells()[*index..].to_vec())
                .unwrap_or_default();
            self.backing = Backing::Reified(remaining);
        }
    }

    /// Splice a macro/inliner's result block onto the front of the feed,
    /// so the next evaluator step consumes its first cell (§4.4
    /// Macro/Inliner). After this call the Feed is always Reified.
    pub fn splice_front(&mut self, pool: &StubPool, cells: Vec<Cell>) {
        let mut spliced = cells;
        match &self.backing {
            Backing::Array { array, index } => {
                if let Ok(stub) = pool.get(*array) {
                    spliced.extend_from_slice(&stub.content.as_cells()[*index..]);
                }
            }
            Backing::Reified(rest) => spliced.extend(rest.iter().cloned()),
        }
        self.backing = Backing::Reified(spliced);
    }

    /// Every cell a currently-Reified feed still owns, contributed to the
    /// GC as part of its owning Level's root set (§4.2 root #4). An
    /// Array-backed feed contributes nothing here — the array itself is
    /// a Stub the caller roots directly.
    pub fn reified_cells(&self) -> &[Cell] {
        match &self.backing {
            Backing::Reified(cells) => cells.as_slice(),
            Backing::Array { .. } => &[],
        }
    }

    pub fn source_array(&self) -> Option<StubId> {
        match &self.backing {
            Backing::Array { array, .. } => Some(*array),
            Backing::Reified(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ren_value::{StubContent, StubFlavor};

    #[test]
    fn next_consumes_in_order_then_ends() {
        let mut pool = StubPool::new();
        let array = pool.make_stub(
            StubFlavor::Source,
            StubContent::Dynamic(vec![Cell::integer(1), Cell::integer(2)]),
        );
        let mut feed = Feed::from_array(array);
        assert_eq!(feed.next(&pool), Some(Cell::integer(1)));
        assert_eq!(feed.next(&pool), Some(Cell::integer(2)));
        assert_eq!(feed.next(&pool), None);
        assert!(feed.is_end(&pool));
    }

    #[test]
    fn splice_front_is_consumed_before_the_remainder() {
        let mut pool = StubPool::new();
        let array = pool.make_stub(
            StubFlavor::Source,
            StubContent::Dynamic(vec![Cell::integer(3)]),
        );
        let mut feed = Feed::from_array(array);
        feed.splice_front(&pool, vec![Cell::integer(1), Cell::integer(2)]);
        assert_eq!(feed.next(&pool), Some(Cell::integer(1)));
        assert_eq!(feed.next(&pool), Some(Cell::integer(2)));
        assert_eq!(feed.next(&pool), Some(Cell::integer(3)));
    }

    #[test]
    fn reify_freezes_remaining_cells_from_an_array_feed() {
        let mut pool = StubPool::new();
        let array = pool.make_stub(
            StubFlavor::Source,
            StubContent::Dynamic(vec![Cell::integer(1), Cell::integer(2), Cell::integer(3)]),
        );
        let mut feed = Feed::from_array(array);
        feed.next(&pool);
        feed.reify(&pool);
        assert_eq!(feed.reified_cells(), &[Cell::integer(2), Cell::integer(3)]);
    }
}
