//! Iterative marking (§4.2): an unmarked Stub is marked and pushed onto a
//! worklist rather than walked recursively, so a deeply nested structure
//! cannot overflow the Rust call stack (the analogue of the source's
//! "mark-stack Flex").

use ren_value::{Cell, Heart, Stub, StubId, StubPool};

/// Mark one stub (if not already marked) and enqueue it for propagation.
/// Safe to call on an id that turns out to be stale — propagation simply
/// skips it, since a dangling root is a bug in the root-collection layer,
/// not a reason to crash the collector (§4.2 "must not fail").
pub fn mark_root(pool: &mut StubPool, id: StubId, worklist: &mut Vec<StubId>) {
    if let Ok(stub) = pool.get_mut(id) {
        if !stub.is_marked() {
            stub.mark();
            worklist.push(id);
        }
    }
}

/// Drain the worklist, marking each stub's cells and flavor-specific side
/// pointers (`link`, `misc`) and any stub ids those cells reference in
/// turn.
pub fn propagate(pool: &mut StubPool, worklist: &mut Vec<StubId>) {
    while let Some(id) = worklist.pop() {
        let (link, misc, referenced) = match pool.get(id) {
            Ok(stub) => (stub.link, stub.misc, collect_cell_refs(stub)),
            Err(_) => continue,
        };
        if let Some(link) = link {
            mark_root(pool, link, worklist);
        }
        if let Some(misc) = misc {
            mark_root(pool, misc, worklist);
        }
        for r in referenced {
            mark_root(pool, r, worklist);
        }
    }
}

fn collect_cell_refs(stub: &Stub) -> Vec<StubId> {
    let mut out = Vec::new();
    for cell in stub.content.as_cells() {
        collect_from_cell(cell, &mut out);
    }
    out
}

fn collect_from_cell(cell: &Cell, out: &mut Vec<StubId>) {
    match &cell.heart {
        Heart::Text(id) | Heart::Binary(id) => out.push(*id),
        Heart::Block(id) | Heart::Group(id) | Heart::Path(id) => out.push(*id),
        Heart::Context(_, id) => out.push(*id),
        Heart::Splice(id) => out.push(*id),
        Heart::Word(w) => {
            out.push(w.spelling);
            if let Some(b) = w.binding {
                out.push(b);
            }
        }
        Heart::Action(a) => {
            out.push(a.paramlist);
            out.push(a.details);
        }
        Heart::Param(p) => out.push(p.symbol),
        Heart::Pair(pair) => {
            collect_from_cell(&pair.0, out);
            collect_from_cell(&pair.1, out);
        }
        Heart::Integer(_)
        | Heart::Decimal(_)
        | Heart::Logic(_)
        | Heart::Char(_)
        | Heart::Null
        | Heart::Void
        | Heart::Trash => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ren_value::{StubContent, StubFlavor};

    #[test]
    fn propagate_follows_block_into_contained_word_spelling() {
        let mut pool = StubPool::new();
        let symbol = pool.make_stub(StubFlavor::Symbol, StubContent::Bytes(b"x".to_vec()));
        let inner_block = pool.make_stub(StubFlavor::Source, StubContent::Dynamic(vec![Cell::word(symbol)]));
        let outer_block = pool.make_stub(
            StubFlavor::Source,
            StubContent::Dynamic(vec![Cell::block(inner_block)]),
        );

        let mut worklist = Vec::new();
        mark_root(&mut pool, outer_block, &mut worklist);
        propagate(&mut pool, &mut worklist);

        assert!(pool.get(outer_block).unwrap().is_marked());
        assert!(pool.get(inner_block).unwrap().is_marked());
        assert!(pool.get(symbol).unwrap().is_marked());
    }
}
