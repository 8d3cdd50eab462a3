use thiserror::Error;

/// Binding-chain failures (§4.6). Looking a symbol up through a chain that
/// never resolves it is the common case here; it is definitional (the
/// caller usually wants to turn this into an ERROR! antiform) rather than
/// abrupt, so it is modeled as an ordinary `Result`, not a panic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BindError {
    #[error("word is not bound in any context on its binding chain")]
    Unbound,
}
