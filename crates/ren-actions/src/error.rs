use thiserror::Error;

use ren_value::StubId;

/// Failures at the action-dispatch layer (§4.4, §7). A type-check failure
/// at parameter binding is the "abrupt" kind per §7's policy — it surfaces
/// as `Bounce::Failed`, unwound like a throw, rather than as a normal
/// return value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("parameter did not type-check against its typeset")]
    TypeMismatch,
    #[error("feed ended while a non-endable parameter was still being fulfilled")]
    EndOfFeed,
    #[error("details stub {0:?} has no registered dispatcher")]
    UnknownDispatcher(StubId),
    #[error("value is not an action! and cannot be dispatched")]
    NotAnAction,
    #[error("no generic implementation registered for this operation and type")]
    GenericNotImplemented,
    #[error("word is unbound")]
    Unbound,
    #[error("{0}")]
    Unsupported(&'static str),
    /// A `raise`-shaped native's definitional error payload (§7 "raise
    /// user-error"): carried as plain text rather than a full ERROR!
    /// context, since only `ren-interp` knows how to build one.
    #[error("{0}")]
    Raised(String),
    #[error(transparent)]
    Value(#[from] ren_value::ValueError),
}

/// An `ActionError` is always the abrupt-failure kind (§7) once it
/// reaches the Trampoline, so it folds into the generic `EvalError`
/// carried by `Bounce::Failed` with no information lost beyond its own
/// `Display` text.
impl From<ActionError> for ren_trampoline::EvalError {
    fn from(err: ActionError) -> Self {
        ren_trampoline::EvalError::message(err.to_string())
    }
}
