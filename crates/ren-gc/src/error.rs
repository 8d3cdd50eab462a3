use thiserror::Error;

/// The GC's own failure model is "must not fail" (§4.2) — these variants
/// exist only for caller misuse (collecting while disabled-and-forced, or
/// re-entering the collector), never for a corrupt heap. A corrupt node
/// discovered mid-sweep aborts the process directly rather than returning
/// one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GcError {
    #[error("garbage collector re-entered while already running a cycle")]
    Reentrant,
    #[error("collection requested while the collector is disabled")]
    Disabled,
}
