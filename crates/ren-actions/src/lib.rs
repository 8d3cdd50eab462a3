//! Action dispatch (§4.4): Paramlist + Details + Dispatcher, the Action
//! Executor that fulfills parameters and hands off to a Dispatcher, and
//! the derivations built on top of the same call ABI (specialize,
//! cascade, adapt, enclose, hijack, macro). Generic dispatch (§4.4
//! "Generic dispatch") lives in `generic`.
//!
//! Depends on `ren-value`, `ren-gc`, `ren-binding`, `ren-trampoline` but
//! not on `ren-interp` — the host capability a caller needs is expressed
//! as the `ActionHost` trait so `ren-interp` can implement it without a
//! dependency cycle (Design Notes §9 "Global mutable state").

pub mod action_executor;
pub mod derive;
pub mod dispatcher;
pub mod error;
pub mod generic;
pub mod host;
pub mod step;

pub use action_executor::ActionExecutor;
pub use derive::cascade::CascadeExecutor;
pub use dispatcher::{Dispatcher, NativeFn, NativeTable};
pub use error::ActionError;
pub use generic::{GenericOp, GenericTable};
pub use host::ActionHost;
pub use step::{EvaluatorExecutor, MetaStepperExecutor, StepperExecutor};
