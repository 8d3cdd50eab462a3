use thiserror::Error;

use crate::stub::StubId;

/// Failures at the Cell/Stub/pool layer. These are the "abrupt" kind of
/// §7's taxonomy when they escape a pool operation directly; higher layers
/// (ren-gc, ren-tweak) wrap them into their own definitional/throw forms
/// where a failure is recoverable instead of fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("stub handle {0:?} is stale (slot recycled)")]
    Stale(StubId),
    #[error("stub handle {0:?} is out of range")]
    OutOfRange(StubId),
    #[error("cannot free managed stub {0:?}: the GC owns its lifetime")]
    FreeOfManaged(StubId),
    #[error("stub {0:?} does not hold a raw byte allocation")]
    NotRawBytes(StubId),
    #[error("antiform {0} cannot be stored as an element of a Source array")]
    AntiformInArray(&'static str),
    #[error("index {0} out of bounds")]
    IndexOutOfBounds(usize),
}
