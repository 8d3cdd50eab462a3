//! [`Cell`]: the uniform value. Conceptually a header word (heart tag,
//! lifting byte, flags) plus three payload words (§3). The payload words
//! are folded into `Heart`'s variants rather than kept as a separate union,
//! per the Design Notes' "tagged sum types vs heart byte" guidance — the
//! heart byte is an implementation detail of the C storage layout, not of
//! the type this crate exposes.

use bitflags::bitflags;

use crate::heart::{ActionRef, ContextKind, Heart, Lift, Word};
use crate::stub::StubId;

bitflags! {
    /// Header flag bits. `PROTECTED` mirrors Ren-C's read-only marking;
    /// the rest are reserved for future parity and are currently unused,
    /// kept so a flag check never has to guess whether a bit "doesn't
    /// exist yet" or "exists and is false".
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellFlags: u8 {
        const PROTECTED = 0b0000_0001;
        const NEWLINE_BEFORE = 0b0000_0010;
        /// Set on an action's archetype cell (Paramlist position 0) when
        /// the action is used in infix position — read by the Action
        /// Executor's defer-to-infix check on a first normal argument
        /// (§4.4).
        const INFIX = 0b0000_0100;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub heart: Heart,
    pub lift: Lift,
    pub flags: CellFlags,
}

impl Cell {
    pub fn new(heart: Heart, lift: Lift) -> Self {
        Self {
            heart,
            lift,
            flags: CellFlags::empty(),
        }
    }

    pub fn fundamental(heart: Heart) -> Self {
        Self::new(heart, Lift::Fundamental)
    }

    pub fn integer(i: i64) -> Self {
        Self::fundamental(Heart::Integer(i))
    }

    pub fn decimal(d: f64) -> Self {
        Self::fundamental(Heart::Decimal(d))
    }

    pub fn char_(c: char) -> Self {
        Self::fundamental(Heart::Char(c))
    }

    pub fn pair(a: Cell, b: Cell) -> Self {
        Self::fundamental(Heart::Pair(Box::new((a, b))))
    }

    pub fn word(spelling: StubId) -> Self {
        Self::fundamental(Heart::Word(Word::unbound(spelling)))
    }

    pub fn bound_word(spelling: StubId, binding: StubId) -> Self {
        Self::fundamental(Heart::Word(Word {
            spelling,
            binding: Some(binding),
        }))
    }

    pub fn block(array: StubId) -> Self {
        Self::fundamental(Heart::Block(array))
    }

    pub fn group(array: StubId) -> Self {
        Self::fundamental(Heart::Group(array))
    }

    pub fn path(array: StubId) -> Self {
        Self::fundamental(Heart::Path(array))
    }

    pub fn context(kind: ContextKind, varlist: StubId) -> Self {
        Self::fundamental(Heart::Context(kind, varlist))
    }

    /// The antiform `true`/`false`. Ren-C's LOGIC! is always an antiform
    /// in a variable and always quoted (`'true`/`'false`) if ever written
    /// into a Source array; this constructor produces the bare in-variable
    /// form callers are expected to lift before storing.
    pub fn logic(b: bool) -> Self {
        Cell {
            heart: Heart::Logic(b),
            lift: Lift::Anti,
            flags: CellFlags::empty(),
        }
    }

    pub fn null() -> Self {
        Cell {
            heart: Heart::Null,
            lift: Lift::Anti,
            flags: CellFlags::empty(),
        }
    }

    pub fn void() -> Self {
        Cell {
            heart: Heart::Void,
            lift: Lift::Anti,
            flags: CellFlags::empty(),
        }
    }

    pub fn trash() -> Self {
        Cell {
            heart: Heart::Trash,
            lift: Lift::Anti,
            flags: CellFlags::empty(),
        }
    }

    pub fn action(paramlist: StubId, details: StubId) -> Self {
        Cell {
            heart: Heart::Action(ActionRef { paramlist, details }),
            lift: Lift::Anti,
            flags: CellFlags::empty(),
        }
    }

    pub fn is_antiform(&self) -> bool {
        self.lift.is_anti()
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self.heart, Heart::Logic(false) | Heart::Null | Heart::Void)
    }

    /// `lift(x)`: wrap a fundamental or antiform value one level up —
    /// Fundamental becomes Quasi, Anti becomes Quasi-of-the-unlifted-form.
    /// This is the primitive used whenever an antiform must be stored in
    /// an array slot (§3) or whenever tweak's meta-access picker is used
    /// (§4.5).
    pub fn lift(mut self) -> Cell {
        self.lift = match self.lift {
            Lift::Fundamental | Lift::Anti => Lift::Quasi,
            Lift::Quasi => Lift::Quasi, // lifting an already-quoted value is a no-op at this depth
        };
        self
    }

    /// `unlift(lift(x)) == x` (§8 testable property). Inverts `lift`
    /// exactly one level: Quasi becomes Fundamental. Antiform-shaped
    /// hearts (Null, Void, Trash, Splice, Action, Logic) are restored to
    /// `Lift::Anti` since those never legitimately rest as Fundamental.
    pub fn unlift(mut self) -> Cell {
        self.lift = if self.heart.is_isotopic() || matches!(self.heart, Heart::Logic(_)) {
            Lift::Anti
        } else {
            Lift::Fundamental
        };
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.heart.type_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlift_of_lift_roundtrips_integer() {
        let x = Cell::integer(42);
        let lifted = x.clone().lift();
        assert_eq!(lifted.lift, Lift::Quasi);
        let back = lifted.unlift();
        assert_eq!(back, x);
    }

    #[test]
    fn unlift_of_lift_roundtrips_null_antiform() {
        let x = Cell::null();
        assert_eq!(x.lift, Lift::Anti);
        let lifted = x.clone().lift();
        assert_eq!(lifted.lift, Lift::Quasi);
        let back = lifted.unlift();
        assert_eq!(back, x);
    }

    #[test]
    fn logic_false_is_falsey_antiform() {
        let f = Cell::logic(false);
        assert!(f.is_antiform());
        assert!(!f.is_truthy());
    }
}
