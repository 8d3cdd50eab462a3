//! The §7 error/throw taxonomy, consolidated on top of the layer errors
//! `ren-value`/`ren-gc`/`ren-binding`/`ren-tweak`/`ren-actions` each report
//! on their own. Only `ren-interp` sees all of them at once, so this is
//! the one place that turns a `TweakError` on a final tweak step into a
//! definitional ERROR! versus an intermediate one into an abrupt failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterpError {
    #[error("evaluation failed: {0}")]
    Eval(#[from] ren_trampoline::EvalError),
    #[error(transparent)]
    Value(#[from] ren_value::ValueError),
    #[error(transparent)]
    Gc(#[from] ren_gc::GcError),
    #[error(transparent)]
    Bind(#[from] ren_binding::error::BindError),
    #[error(transparent)]
    Tweak(#[from] ren_tweak::TweakError),
    #[error(transparent)]
    Action(#[from] ren_actions::ActionError),
    #[error("no action registered under the name {0:?}")]
    UnknownWord(String),
    /// `rebJumps`'s contract (§6): the call is expected never to return
    /// normally (it should `quit`, `throw`, or otherwise unwind). Reaching
    /// this variant means the evaluated block returned a plain value
    /// instead.
    #[error("jumps: evaluation returned normally instead of jumping")]
    DidNotJump,
}
