//! [`Bounce`]: the control-flow return code an Executor hands back to the
//! Trampoline (§4.3).

use crate::error::EvalError;
use crate::level::Level;
use crate::throw::Throw;

#[derive(Debug)]
pub enum Bounce<C> {
    /// The Executor wrote its result into `Level.output`; pop this Level
    /// and resume the caller.
    Out,
    /// A new Level has been pushed; the Trampoline resumes with it on
    /// top.
    ContinueSublevel(Level<C>),
    /// As `ContinueSublevel`, but when the sub-Level signals `Out`, its
    /// result becomes the *caller's* answer directly — this Level is not
    /// re-entered.
    DelegateSublevel(Level<C>),
    /// A non-local exit is propagating; the Trampoline unwinds Levels
    /// until it reaches `Throw::target`.
    Thrown(Throw),
    /// This Level has been replaced in place by a new one beneath it
    /// (Cascader stealing a varlist, §4.4). Modeled identically to
    /// `ContinueSublevel` by the Trampoline itself — see
    /// `ren-actions::cascade` for the bookkeeping that makes the
    /// replacement meaningful.
    Downshifted(Level<C>),
    /// Re-enter this Level's own Executor again without popping,
    /// revalidating whatever `REDO_CHECKED` implies for that Executor
    /// (Adapter/Cascader phase transitions, §4.4).
    RedoChecked,
    /// As `RedoChecked`, without revalidation.
    RedoUnchecked,
    /// The Executor produced no result; the caller should behave as
    /// though nothing happened at this slot.
    Invisible,
    /// The Rust equivalent of the source's longjmp-based abrupt failure
    /// (§7, §9): unwound exactly like `Thrown`, but carrying a genuine
    /// error rather than a caught-and-inspectable value.
    Failed(EvalError),
}
