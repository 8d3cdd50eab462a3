//! [`Stub`]: the heap-object header (§4.1). A fixed-width leader plus a
//! content area that is either a single inline Cell ("singular") or a
//! growable buffer ("dynamic"), plus two flavor-dependent side slots.

use bitflags::bitflags;

use crate::cell::Cell;

/// Opaque arena handle replacing a raw Stub pointer, per the Design Notes'
/// "arenas + indices, not raw pointers": a `StubPool` hands these out and
/// checks `generation` on every dereference so a stale id is a catchable
/// [`crate::error::ValueError::Stale`] instead of a dangling-pointer panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StubId {
    pub index: u32,
    pub generation: u32,
}

bitflags! {
    /// The Stub leader byte's contract (§4.1): bit 0x80 always set on a
    /// live node so a raw-pointer detector can tell it apart from an
    /// ASCII/UTF-8 byte stream passed through the same variadic API; bit
    /// 0x40 for unreadable; bit 0x08 for "this unit holds a Cell pair
    /// instead of Stub fields" (the PAIR! inline case). `MANAGED` and
    /// `MARKED` are the GC's reserved bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StubLeader: u8 {
        const IS_NODE          = 0b1000_0000;
        const UNREADABLE       = 0b0100_0000;
        const MANAGED          = 0b0010_0000;
        const MARKED           = 0b0001_0000;
        const ROOT             = 0b0000_0100;
        const IS_CELL_PAIR     = 0b0000_1000;
        /// Set when the Level that solely owned this unmanaged stub has
        /// died; the next sweep frees it even though it was never
        /// promoted to managed (§4.2 sweep, expired-Level case).
        const ORPHANED         = 0b0000_0010;
    }
}

impl Default for StubLeader {
    fn default() -> Self {
        StubLeader::IS_NODE
    }
}

/// The flavor tag determining how `link`/`misc` and the content area are
/// interpreted (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StubFlavor {
    /// An array of cells that is part of the source.
    Source,
    /// An object/frame context; cells are variable slots.
    Varlist,
    /// Describes an action's parameters.
    Paramlist,
    /// An action's per-dispatcher private data, owned by one Dispatcher.
    Details,
    /// Interned identifier bytes.
    Symbol,
    /// A streaming source of cells for a Level.
    Feed,
    String,
    Binary,
    /// A lightweight lexical extension (no Varlist of its own).
    Use,
}

/// The content area of a Stub: either a single inline Cell (including the
/// PAIR! special case, and Varlist/Paramlist archetype-only stubs before
/// they grow), a growable Cell array, or a raw byte buffer (String,
/// Binary, Symbol spelling).
#[derive(Debug, Clone)]
pub enum StubContent {
    Singular(Cell),
    Dynamic(Vec<Cell>),
    Bytes(Vec<u8>),
}

impl StubContent {
    pub fn as_cells(&self) -> &[Cell] {
        match self {
            StubContent::Singular(c) => std::slice::from_ref(c),
            StubContent::Dynamic(v) => v.as_slice(),
            StubContent::Bytes(_) => &[],
        }
    }

    pub fn as_cells_mut(&mut self) -> &mut [Cell] {
        match self {
            StubContent::Singular(c) => std::slice::from_mut(c),
            StubContent::Dynamic(v) => v.as_mut_slice(),
            StubContent::Bytes(_) => &mut [],
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            StubContent::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }
}

/// The heap-object header plus its content, flavor, and the two
/// flavor-dependent side slots (`link`, `misc`) — e.g. a Varlist's `link`
/// is its keylist, a Details' `misc` may hold an adapt/specialize
/// ancestor pointer.
#[derive(Debug, Clone)]
pub struct Stub {
    pub leader: StubLeader,
    pub flavor: StubFlavor,
    pub content: StubContent,
    pub link: Option<StubId>,
    pub misc: Option<StubId>,
}

impl Stub {
    pub fn new(flavor: StubFlavor, content: StubContent) -> Self {
        Self {
            leader: StubLeader::default(),
            flavor,
            content,
            link: None,
            misc: None,
        }
    }

    pub fn is_managed(&self) -> bool {
        self.leader.contains(StubLeader::MANAGED)
    }

    pub fn is_marked(&self) -> bool {
        self.leader.contains(StubLeader::MARKED)
    }

    pub fn is_root(&self) -> bool {
        self.leader.contains(StubLeader::ROOT)
    }

    pub fn mark(&mut self) {
        self.leader.insert(StubLeader::MARKED);
    }

    pub fn unmark(&mut self) {
        self.leader.remove(StubLeader::MARKED);
    }
}
