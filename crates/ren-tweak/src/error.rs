use thiserror::Error;

/// Failures from the tweak protocol (§4.5, §7). §4.5 "Errors": a failure on
/// the *final* step is definitional (the caller wraps it as a raised
/// ERROR! antiform and may `try` it away); a failure partway through a
/// chain of steps indicates a genuinely broken reference and is abrupt.
/// This crate only reports which step failed and why — turning that into
/// the right §7 taxonomy kind is `ren-interp`'s job, since it is the one
/// place that knows whether a given `TweakError` came from a final or an
/// intermediate step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TweakError {
    #[error("root word is not bound in any context on its binding chain")]
    UnboundRoot,
    #[error("method coupling requested but no enclosing object/frame found on the binding chain")]
    NoCoupling,
    #[error("picker {0:?} does not select a field of this value")]
    NoSuchField(&'static str),
    #[error("symbol picker used against a value that is not an object/frame/module/port/error")]
    NotAContext,
    #[error("index picker used against a value that is neither a pair! nor a block!")]
    NotIndexable,
    #[error("index {0} is out of range for this pair!/block!")]
    IndexOutOfRange(usize),
    #[error("a non-final step in the path failed: {0}")]
    IntermediateStepFailed(String),
    #[error(transparent)]
    Value(#[from] ren_value::ValueError),
}
