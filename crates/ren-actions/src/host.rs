//! The capability surface an Executor in this crate needs from its host
//! context (Design Notes §9 "Global mutable state": the interpreter
//! handle that owns all the pools and tables). `ren-interp`'s
//! `Interpreter` is the concrete implementor; keeping the bound here
//! rather than depending on `ren-interp` directly keeps this crate free
//! of the cycle `ren-interp -> ren-actions -> ren-interp` would create.

use ren_gc::GuardHandle;
use ren_value::{StubId, StubPool};

use crate::dispatcher::NativeTable;
use crate::generic::GenericTable;

pub trait ActionHost: Sized {
    fn pool(&self) -> &StubPool;
    fn pool_mut(&mut self) -> &mut StubPool;
    fn natives(&self) -> &NativeTable<Self>;
    fn natives_mut(&mut self) -> &mut NativeTable<Self>;
    fn generics(&self) -> &GenericTable<Self>;
    /// `push_guard(node)` (§4.2, §5): protect a temporary across however
    /// many Trampoline steps elapse before it is either stored somewhere
    /// reachable or dropped.
    fn guard(&mut self, id: StubId) -> GuardHandle;
}
