//! Sweep (§4.2): walk every pool unit. Managed+marked stubs are unmarked
//! and kept; managed+unmarked stubs are freed; unmanaged stubs are left
//! alone unless orphaned by a dead Level, in which case they are freed
//! too.

use tracing::debug;

use ren_value::{StubId, StubPool};

#[derive(Debug, Default, Clone, Copy)]
pub struct SweepReport {
    pub freed: usize,
    pub kept: usize,
}

pub fn sweep(pool: &mut StubPool) -> SweepReport {
    let mut report = SweepReport::default();
    let ids: Vec<StubId> = pool.occupied_ids();
    for id in ids {
        let (managed, marked, orphaned) = match pool.get(id) {
            Ok(stub) => (
                stub.is_managed(),
                stub.is_marked(),
                stub
                    .leader
                    .contains(ren_value::StubLeader::ORPHANED),
            ),
            Err(_) => continue,
        };
        if managed && marked {
            pool.get_mut(id).unwrap().unmark();
            report.kept += 1;
        } else if managed && !marked {
            let _ = pool.force_free(id);
            report.freed += 1;
        } else if !managed && orphaned {
            let _ = pool.force_free(id);
            report.freed += 1;
        } else {
            report.kept += 1;
        }
    }
    debug!(target: "gc.sweep", freed = report.freed, kept = report.kept, "sweep complete");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::mark_root;
    use ren_value::{Cell, StubContent, StubFlavor};

    #[test]
    fn sweep_frees_unmarked_managed_and_keeps_marked() {
        let mut pool = StubPool::new();
        let kept = pool.make_stub(StubFlavor::Source, StubContent::Dynamic(vec![Cell::integer(1)]));
        let freed = pool.make_stub(StubFlavor::Source, StubContent::Dynamic(vec![Cell::integer(2)]));
        pool.manage(kept).unwrap();
        pool.manage(freed).unwrap();

        let mut worklist = Vec::new();
        mark_root(&mut pool, kept, &mut worklist);
        crate::mark::propagate(&mut pool, &mut worklist);

        let report = sweep(&mut pool);
        assert_eq!(report.freed, 1);
        assert!(pool.is_live(kept));
        assert!(!pool.is_live(freed));
        // The kept stub must have its mark bit cleared for the next cycle.
        assert!(!pool.get(kept).unwrap().is_marked());
    }

    #[test]
    fn sweep_leaves_unmanaged_stubs_alone_unless_orphaned() {
        let mut pool = StubPool::new();
        let unmanaged = pool.make_stub(StubFlavor::Source, StubContent::Dynamic(vec![]));
        let orphaned = pool.make_stub(StubFlavor::Source, StubContent::Dynamic(vec![]));
        pool.get_mut(orphaned)
            .unwrap()
            .leader
            .insert(ren_value::StubLeader::ORPHANED);

        let report = sweep(&mut pool);
        assert_eq!(report.freed, 1);
        assert!(pool.is_live(unmanaged));
        assert!(!pool.is_live(orphaned));
    }
}
