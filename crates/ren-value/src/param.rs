//! Parameter descriptors: the cells that occupy positions 1.. of a
//! Paramlist (§4.4). Modeled here (not in `ren-actions`) because §3 lists
//! Paramlist among the Data Model's "containers built on Stubs", shared
//! between an action's own parameter list and an object's keylist.

use bitflags::bitflags;

use crate::stub::StubId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamClass {
    Normal,
    Tight,
    HardQuote,
    SoftQuote,
    Refinement,
    Local,
    Return,
}

bitflags! {
    /// Which fundamental types a parameter accepts. `ANY` is the typical
    /// default for an object key (no narrowing); actions narrow this per
    /// parameter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Typeset: u32 {
        const INTEGER = 1 << 0;
        const DECIMAL = 1 << 1;
        const LOGIC   = 1 << 2;
        const CHAR    = 1 << 3;
        const TEXT    = 1 << 4;
        const BINARY  = 1 << 5;
        const WORD    = 1 << 6;
        const BLOCK   = 1 << 7;
        const GROUP   = 1 << 8;
        const PATH    = 1 << 9;
        const PAIR    = 1 << 10;
        const ACTION  = 1 << 11;
        const OBJECT  = 1 << 12;
        const NULL    = 1 << 13;
        const ANY     = u32::MAX;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Elided from the call surface by specialization (§4.4 fulfillment step 1).
        const HIDDEN = 0b0000_0001;
        /// Tolerates end-of-feed as null instead of failing (§4.4).
        const ENDABLE = 0b0000_0010;
        /// On an infix action's first parameter: the retrigger is
        /// deferred one step rather than happening immediately (§4.4
        /// "Defer-to-infix first argument").
        const DEFERS_LOOKBACK = 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub symbol: StubId,
    pub class: ParamClass,
    pub typeset: Typeset,
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    pub fn new(symbol: StubId, class: ParamClass, typeset: Typeset) -> Self {
        Self {
            symbol,
            class,
            typeset,
            flags: ParamFlags::empty(),
        }
    }

    pub fn hidden(mut self) -> Self {
        self.flags.insert(ParamFlags::HIDDEN);
        self
    }

    pub fn endable(mut self) -> Self {
        self.flags.insert(ParamFlags::ENDABLE);
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(ParamFlags::HIDDEN)
    }

    pub fn is_endable(&self) -> bool {
        self.flags.contains(ParamFlags::ENDABLE)
    }

    pub fn defers_lookback(&self) -> bool {
        self.flags.contains(ParamFlags::DEFERS_LOOKBACK)
    }

    pub fn defer_lookback(mut self) -> Self {
        self.flags.insert(ParamFlags::DEFERS_LOOKBACK);
        self
    }

    pub fn accepts(&self, heart: &crate::heart::Heart) -> bool {
        if self.typeset == Typeset::ANY {
            return true;
        }
        match Typeset::bit_for(heart) {
            Some(bit) => self.typeset.contains(bit),
            None => false,
        }
    }
}

impl Typeset {
    /// The single bit a concrete Heart corresponds to, if any — shared by
    /// [`ParamDescriptor::accepts`] and a `TYPECHECKER!` Dispatcher, which
    /// both need to turn a value into "does this typeset accept it".
    pub fn bit_for(heart: &crate::heart::Heart) -> Option<Typeset> {
        Some(match heart {
            crate::heart::Heart::Integer(_) => Typeset::INTEGER,
            crate::heart::Heart::Decimal(_) => Typeset::DECIMAL,
            crate::heart::Heart::Logic(_) => Typeset::LOGIC,
            crate::heart::Heart::Char(_) => Typeset::CHAR,
            crate::heart::Heart::Text(_) => Typeset::TEXT,
            crate::heart::Heart::Binary(_) => Typeset::BINARY,
            crate::heart::Heart::Word(_) => Typeset::WORD,
            crate::heart::Heart::Block(_) => Typeset::BLOCK,
            crate::heart::Heart::Group(_) => Typeset::GROUP,
            crate::heart::Heart::Path(_) => Typeset::PATH,
            crate::heart::Heart::Pair(_) => Typeset::PAIR,
            crate::heart::Heart::Action(_) => Typeset::ACTION,
            crate::heart::Heart::Context(..) => Typeset::OBJECT,
            crate::heart::Heart::Null => Typeset::NULL,
            _ => return None,
        })
    }
}
