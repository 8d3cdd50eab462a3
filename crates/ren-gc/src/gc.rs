//! The collector proper: stop-the-world mark-and-sweep over the Stub
//! pool (§4.2), with ballast/torture knobs and recursive-entry detection.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{trace, warn};

use ren_value::{StubId, StubPool};

use crate::error::GcError;
use crate::guard::GuardStack;
use crate::mark::{mark_root, propagate};
use crate::sweep::{SweepReport, sweep};

#[derive(Debug, Default)]
pub struct GcStats {
    pub cycles_run: AtomicU64,
    pub stubs_freed: AtomicU64,
}

/// Root-contributing state the collector doesn't own itself: the API
/// root-handle list lives directly on pool stubs via `StubLeader::ROOT`
/// and is collected from there; everything else (data stack, Level
/// stack, native table, symbol canon) is supplied by the caller at
/// collect-time so this crate never needs to depend on `ren-trampoline`
/// or `ren-binding` (§9 "Global mutable state" — `ren-interp` is the one
/// place that knows about all of them at once).
pub struct Gc {
    guard_stack: GuardStack,
    enabled: bool,
    running: bool,
    torture: bool,
    ballast_bytes: usize,
    bytes_since_sweep: usize,
    stats: GcStats,
}

impl Default for Gc {
    fn default() -> Self {
        Self::new()
    }
}

impl Gc {
    pub fn new() -> Self {
        Self {
            guard_stack: GuardStack::new(),
            enabled: true,
            running: false,
            torture: false,
            ballast_bytes: 1 << 20,
            bytes_since_sweep: 0,
            stats: GcStats::default(),
        }
    }

    pub fn guard_stack(&self) -> &GuardStack {
        &self.guard_stack
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Torture mode: run a full cycle on every allocation notification
    /// (§4.2 "Ballast and disable").
    pub fn set_torture(&mut self, on: bool) {
        self.torture = on;
    }

    pub fn set_ballast(&mut self, bytes: usize) {
        self.ballast_bytes = bytes;
    }

    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Called by allocation sites to accumulate ballast; returns true if
    /// a collection is now due (torture mode always says yes).
    pub fn note_allocation(&mut self, bytes: usize) -> bool {
        if self.torture {
            return true;
        }
        self.bytes_since_sweep += bytes;
        self.bytes_since_sweep >= self.ballast_bytes
    }

    /// Roots every API-exposed handle (§4.2 root #1): any stub still
    /// carrying `StubLeader::ROOT`.
    fn api_roots(pool: &StubPool) -> Vec<StubId> {
        pool.occupied_ids()
            .into_iter()
            .filter(|id| pool.get(*id).map(|s| s.is_root()).unwrap_or(false))
            .collect()
    }

    /// Run one full stop-the-world cycle. `extra_roots` supplies
    /// everything the collector doesn't track on its own — the data
    /// stack, the Level stack, the native-action table, the symbol canon
    /// (§4.2 roots #3-#6). `pre_mark` runs once before marking begins and
    /// is the variadic-reification hook (§4.2): any Level backed by an
    /// unreplayable varargs feed must be rewritten to an Array first,
    /// since reification is the one place the GC is allowed to allocate.
    pub fn collect(
        &mut self,
        pool: &mut StubPool,
        extra_roots: impl IntoIterator<Item = StubId>,
        mut pre_mark: impl FnMut(&mut StubPool),
    ) -> Result<SweepReport, GcError> {
        if !self.enabled {
            return Err(GcError::Disabled);
        }
        if self.running {
            return Err(GcError::Reentrant);
        }
        self.running = true;
        self.bytes_since_sweep = 0;

        pre_mark(pool);

        let mut worklist = Vec::new();
        for id in Self::api_roots(pool) {
            mark_root(pool, id, &mut worklist);
        }
        for id in self.guard_stack.roots() {
            mark_root(pool, id, &mut worklist);
        }
        for id in extra_roots {
            mark_root(pool, id, &mut worklist);
        }
        propagate(pool, &mut worklist);

        let report = sweep(pool);

        self.stats.cycles_run.fetch_add(1, Ordering::Relaxed);
        self.stats
            .stubs_freed
            .fetch_add(report.freed as u64, Ordering::Relaxed);
        if !self.guard_stack.is_balanced() {
            warn!(target: "gc", depth = self.guard_stack.depth(), "guard stack unbalanced across a collection");
        }
        trace!(target: "gc", freed = report.freed, kept = report.kept, "collect cycle finished");

        self.running = false;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ren_value::{Cell, StubContent, StubFlavor};

    #[test]
    fn collect_frees_unreachable_and_keeps_rooted() {
        let mut pool = StubPool::new();
        let mut gc = Gc::new();

        let rooted = pool.make_stub(StubFlavor::Source, StubContent::Dynamic(vec![Cell::integer(1)]));
        pool.manage(rooted).unwrap();
        pool.get_mut(rooted).unwrap().leader.insert(ren_value::StubLeader::ROOT);

        let garbage = pool.make_stub(StubFlavor::Source, StubContent::Dynamic(vec![Cell::integer(2)]));
        pool.manage(garbage).unwrap();

        let report = gc.collect(&mut pool, std::iter::empty(), |_| {}).unwrap();
        assert_eq!(report.freed, 1);
        assert!(pool.is_live(rooted));
        assert!(!pool.is_live(garbage));
    }

    #[test]
    fn disabled_collector_refuses_to_run() {
        let mut pool = StubPool::new();
        let mut gc = Gc::new();
        gc.disable();
        assert!(matches!(
            gc.collect(&mut pool, std::iter::empty(), |_| {}),
            Err(GcError::Disabled)
        ));
    }

    #[test]
    fn ballast_trips_after_enough_bytes() {
        let mut gc = Gc::new();
        gc.set_ballast(100);
        assert!(!gc.note_allocation(40));
        assert!(gc.note_allocation(70));
    }

    #[test]
    fn torture_mode_always_due() {
        let mut gc = Gc::new();
        gc.set_torture(true);
        assert!(gc.note_allocation(1));
    }
}
