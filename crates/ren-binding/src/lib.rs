//! Symbol interning and binding chains (§4.6): the canon table that makes
//! equal spellings compare equal by identity, plus the lightweight `Use`/
//! `Varlist` chain a word's binding walks to find its slot.
//!
//! Depends only on `ren-value` — the Trampoline (`ren-trampoline`) and
//! tweak (`ren-tweak`) build on top of `Canon` and `resolve`/`find_coupling`
//! rather than this crate reaching upward.

pub mod canon;
pub mod chain;
pub mod error;

pub use canon::Canon;
pub use chain::{bind_deep, find_coupling, make_use, resolve};
pub use error::BindError;
