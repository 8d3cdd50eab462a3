//! Generic dispatch (§4.4): some actions (APPEND, COPY, PICK, ...) consult
//! a per-datatype table indexed by the first argument's heart tag rather
//! than carrying their own single Dispatcher.

use std::collections::HashMap;

use ren_value::{Cell, HeartTag};

use crate::dispatcher::NativeFn;
use crate::host::ActionHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericOp {
    Append,
    Copy,
    Pick,
}

pub struct GenericTable<H: ActionHost> {
    entries: HashMap<(GenericOp, HeartTag), NativeFn<H>>,
}

impl<H: ActionHost> Default for GenericTable<H> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<H: ActionHost> GenericTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, op: GenericOp, heart: HeartTag, f: NativeFn<H>) {
        self.entries.insert((op, heart), f);
    }

    pub fn lookup(&self, op: GenericOp, heart: HeartTag) -> Option<NativeFn<H>> {
        self.entries.get(&(op, heart)).copied()
    }

    /// Dispatch `op` by the heart of `args`'s first element, per §4.4
    /// "Generic dispatch".
    pub fn dispatch(&self, host: &mut H, op: GenericOp, args: &[Cell]) -> Result<Cell, crate::error::ActionError> {
        let first = args.first().ok_or(crate::error::ActionError::EndOfFeed)?;
        let f = self
            .lookup(op, first.heart.tag())
            .ok_or(crate::error::ActionError::GenericNotImplemented)?;
        f(host, args)
    }
}
