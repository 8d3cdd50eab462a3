//! The Trampoline and its Level stack (§4.3): the outer evaluation loop
//! that replaces C stack recursion with an explicit, heap-resident stack
//! of [`Level`]s, each advanced one [`Bounce`] at a time by an
//! [`level::Executor`].
//!
//! This crate is generic over the host context `C` an Executor needs
//! (pool, canon, action dispatch table, tweak) rather than depending on
//! `ren-actions`/`ren-tweak`/`ren-interp` directly — `ren-interp` is the
//! one crate that instantiates `C` concretely and ties everything
//! together (Design Notes §9 "Global mutable state").

pub mod bounce;
pub mod error;
pub mod feed;
pub mod level;
pub mod throw;
pub mod trampoline;

pub use bounce::Bounce;
pub use error::EvalError;
pub use feed::Feed;
pub use level::{Executor, Level, LevelId, Pending};
pub use throw::Throw;
pub use trampoline::{HaltFlag, Trampoline};
