//! The fundamental type tag of a [`Cell`](crate::cell::Cell), independent of
//! its lifting state.
//!
//! The C source packs this into a single byte alongside a pile of flag bits.
//! Here it is a tagged sum with one variant per heart, carrying its payload
//! inline instead of through an untyped union. The heart byte from the
//! original is an implementation detail of storage, not of the public type,
//! so it does not appear anywhere in this API.

use crate::param::ParamDescriptor;
use crate::stub::StubId;

/// Archetype kind carried by the first cell of a Varlist. Distinguishes the
/// five context-shaped things the core knows about without needing a
/// separate heart per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Object,
    Frame,
    Module,
    Error,
    Port,
}

/// A word cell's payload: a spelling (interned Symbol stub) plus the
/// opaque binding it currently carries. Binding is virtual — copying the
/// cell into a new environment only ever changes `binding`, never
/// `spelling` (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    pub spelling: StubId,
    pub binding: Option<StubId>,
}

impl Word {
    pub fn unbound(spelling: StubId) -> Self {
        Self {
            spelling,
            binding: None,
        }
    }
}

/// An action cell's payload: its Paramlist and its Details, per §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRef {
    pub paramlist: StubId,
    pub details: StubId,
}

/// The fundamental type tag, with payload. `Pair` is the one variant that
/// is deliberately inline rather than Stub-backed: §4.1 notes a Stub is
/// exactly two Cells wide, so a 2-cell PAIR! fits in a Stub's singular
/// content slot with no extra indirection — modeled here as a boxed tuple
/// so `Heart` itself stays a flat, Copy-friendly-ish enum for the other
/// variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Heart {
    Integer(i64),
    Decimal(f64),
    Logic(bool),
    Char(char),
    Pair(Box<(super::cell::Cell, super::cell::Cell)>),

    Text(StubId),
    Binary(StubId),

    Word(Word),
    /// An ordinary evaluable sequence of cells (Source flavor stub).
    Block(StubId),
    /// A group: evaluated immediately wherever it is encountered, used by
    /// soft-quote parameter classes and by picker steps in tweak (§4.4, §4.5).
    Group(StubId),
    /// A dotted/slashed sequence of picker cells, compiled by tweak (§4.5).
    Path(StubId),

    Action(ActionRef),
    Context(ContextKind, StubId),
    /// One entry of a Paramlist (§3, §4.4): either an action's parameter
    /// or an object/module's key. Never appears outside position 1.. of a
    /// Paramlist-flavor Stub.
    Param(ParamDescriptor),

    /// The antiform-only null. Forbidden as a Fundamental/Quasi array
    /// element; only ever appears with `Lift::Anti`.
    Null,
    /// Ren-C's "nothing" antiform, produced by invisible operations.
    Void,
    /// A splice marker used by macro/inliner derivations (§4.4).
    Splice(StubId),
    /// The universal "uninitialized slot" antiform.
    Trash,
}

/// A bare discriminant of [`Heart`], stripped of payload — what a generic
/// dispatch table (§4.4) indexes on, and what a Typeset bit (`ren-value`'s
/// `param` module) corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeartTag {
    Integer,
    Decimal,
    Logic,
    Char,
    Pair,
    Text,
    Binary,
    Word,
    Block,
    Group,
    Path,
    Action,
    Context(ContextKind),
    Param,
    Null,
    Void,
    Splice,
    Trash,
}

impl Heart {
    /// True for the hearts that are forbidden to appear as a Fundamental
    /// in a Source array unless lifted — i.e. that only make sense as
    /// antiforms or as quasiforms (§3).
    pub fn is_isotopic(&self) -> bool {
        matches!(
            self,
            Heart::Null | Heart::Void | Heart::Splice(_) | Heart::Trash | Heart::Action(_)
        )
    }

    pub fn tag(&self) -> HeartTag {
        match self {
            Heart::Integer(_) => HeartTag::Integer,
            Heart::Decimal(_) => HeartTag::Decimal,
            Heart::Logic(_) => HeartTag::Logic,
            Heart::Char(_) => HeartTag::Char,
            Heart::Pair(_) => HeartTag::Pair,
            Heart::Text(_) => HeartTag::Text,
            Heart::Binary(_) => HeartTag::Binary,
            Heart::Word(_) => HeartTag::Word,
            Heart::Block(_) => HeartTag::Block,
            Heart::Group(_) => HeartTag::Group,
            Heart::Path(_) => HeartTag::Path,
            Heart::Action(_) => HeartTag::Action,
            Heart::Context(kind, _) => HeartTag::Context(*kind),
            Heart::Param(_) => HeartTag::Param,
            Heart::Null => HeartTag::Null,
            Heart::Void => HeartTag::Void,
            Heart::Splice(_) => HeartTag::Splice,
            Heart::Trash => HeartTag::Trash,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Heart::Integer(_) => "integer!",
            Heart::Decimal(_) => "decimal!",
            Heart::Logic(_) => "logic!",
            Heart::Char(_) => "char!",
            Heart::Pair(_) => "pair!",
            Heart::Text(_) => "text!",
            Heart::Binary(_) => "binary!",
            Heart::Word(_) => "word!",
            Heart::Block(_) => "block!",
            Heart::Group(_) => "group!",
            Heart::Path(_) => "path!",
            Heart::Action(_) => "action!",
            Heart::Param(_) => "parameter!",
            Heart::Context(ContextKind::Object, _) => "object!",
            Heart::Context(ContextKind::Frame, _) => "frame!",
            Heart::Context(ContextKind::Module, _) => "module!",
            Heart::Context(ContextKind::Error, _) => "error!",
            Heart::Context(ContextKind::Port, _) => "port!",
            Heart::Null => "null",
            Heart::Void => "void",
            Heart::Splice(_) => "splice!",
            Heart::Trash => "trash!",
        }
    }
}

/// The quote/quasi/anti transformation of a cell's public form (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lift {
    /// The value represents itself.
    Fundamental,
    /// A `~word~`-shaped wrapper, the visible representation of something
    /// otherwise invisible.
    Quasi,
    /// The in-variable-only isotopic form. Never legal inside a Source
    /// array.
    Anti,
}

impl Lift {
    pub fn is_anti(self) -> bool {
        matches!(self, Lift::Anti)
    }
}
