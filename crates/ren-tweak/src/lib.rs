//! Generalized variable access (§4.5): SET-WORD!/GET-WORD!, object member
//! access, and PICK/POKE all reduce to the same `tweak` walk over a
//! compiled [`Steps`] path, returning a [`Dual`] so a slot holding a
//! reactive getter/setter action can be told apart from one holding a
//! plain value.
//!
//! Depends on `ren-value` for the Cell/Stub model and `ren-binding` for
//! chain resolution and method coupling, but not on `ren-trampoline` or
//! `ren-actions` — invoking a `Dual::Getter` needs a Level, which only
//! `ren-interp` can push.

pub mod dual;
pub mod engine;
pub mod error;
pub mod steps;

pub use dual::{Dual, Incoming};
pub use engine::{get, set, StepFailure};
pub use error::TweakError;
pub use steps::{Picker, RootRef, Steps};

use ren_binding::chain::resolve;
use ren_value::StubId;

/// Compile a root word's binding into a [`RootRef::Slot`] ready for
/// `steps.push`-ing further pickers onto (§4.5 "compiles ... starting
/// from the word's own binding").
pub fn compile_root(
    pool: &ren_value::StubPool,
    binding: Option<StubId>,
    symbol: StubId,
) -> Result<Steps, TweakError> {
    let Some(binding) = binding else {
        return Err(TweakError::UnboundRoot);
    };
    let (varlist, index) = resolve(pool, binding, symbol).map_err(|_| TweakError::UnboundRoot)?;
    Ok(Steps::new(RootRef::Slot { varlist, index }))
}
