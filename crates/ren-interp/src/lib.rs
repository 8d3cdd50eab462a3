//! The consolidated `Interpreter` handle (Design Notes §9 "Global mutable
//! state"): the one place that owns a `StubPool`, a `Gc`, a `Canon`, and
//! the native/generic dispatch tables, tying together every lower crate
//! (`ren-value`, `ren-gc`, `ren-binding`, `ren-tweak`, `ren-trampoline`,
//! `ren-actions`) behind a single API. Also consolidates the §7
//! error/throw taxonomy — only this crate sees all of the layer errors at
//! once, so it is the one place that can decide "abrupt" vs
//! "definitional" at the `rescue` boundary.

pub mod error;
pub mod errors;
pub mod interpreter;
pub mod natives;

pub use error::InterpError;
pub use interpreter::Interpreter;
