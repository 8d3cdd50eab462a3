//! Cell & Stub model: the uniform 4-slot value, the heap-object header,
//! and the pool allocator they live in (§4.1), plus the three container
//! shapes §3 builds on top of Stubs: Source arrays, Varlists, Paramlists
//! and Details.
//!
//! This crate has no knowledge of the garbage collector, the evaluator, or
//! action dispatch semantics — it only models storage. Everything above
//! it (`ren-gc`, `ren-trampoline`, `ren-actions`, `ren-binding`,
//! `ren-tweak`) is built on top of `Cell`, `Stub`, and `StubPool`.

pub mod array;
pub mod cell;
pub mod context;
pub mod details;
pub mod error;
pub mod heart;
pub mod param;
pub mod paramlist;
pub mod pool;
pub mod stub;

pub use array::SourceArray;
pub use cell::{Cell, CellFlags};
pub use error::ValueError;
pub use heart::{ActionRef, ContextKind, Heart, HeartTag, Lift, Word};
pub use param::{ParamClass, ParamDescriptor, ParamFlags, Typeset};
pub use pool::StubPool;
pub use stub::{Stub, StubContent, StubFlavor, StubId, StubLeader};
