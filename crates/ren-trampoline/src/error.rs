use thiserror::Error;

/// The Rust stand-in for the source's longjmp-based abrupt failure (§7,
/// §9 "Longjmp → tagged failure"): instead of unwinding the C stack via
/// `setjmp`/`longjmp`, an Executor returns `Bounce::Failed(EvalError)` and
/// the Trampoline unwinds Levels exactly as it would for a [`crate::Throw`],
/// until a `rescue` boundary converts it into an ERROR! value.
#[derive(Debug, Error, Clone)]
pub enum EvalError {
    #[error("{0}")]
    Message(String),
    #[error("throw labelled {label:?} was never caught by any Level on the stack")]
    Uncaught {
        label: Option<ren_value::StubId>,
    },
    #[error("the trampoline's Level stack is empty")]
    EmptyStack,
}

impl EvalError {
    pub fn message(text: impl Into<String>) -> Self {
        EvalError::Message(text.into())
    }
}
