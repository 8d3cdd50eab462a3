//! Binding resolution (§4.6): a word's binding is a Stub that is either
//! unbound, a Varlist (object/module/frame), or a Use (lightweight
//! lexical extension), chained by an inherit-bind pointer. Binding is
//! virtual — walking the chain never mutates a word's spelling.

use ren_value::context::varlist_keylist;
use ren_value::paramlist::find_param_index;
use ren_value::{Cell, ContextKind, Heart, StubContent, StubFlavor, StubId, StubPool};

use crate::error::BindError;

/// Create a lightweight lexical extension pointing at `varlist`'s
/// arguments, chained to `outer` (the next binding to fall back to).
/// Closures and LAMBDA wrap their body this way (§4.6).
pub fn make_use(pool: &mut StubPool, varlist: StubId, outer: Option<StubId>) -> StubId {
    let id = pool.make_stub(StubFlavor::Use, StubContent::Singular(Cell::trash()));
    if let Ok(stub) = pool.get_mut(id) {
        stub.link = Some(varlist);
        stub.misc = outer;
    }
    id
}

/// Resolve `symbol` by walking the binding chain starting at `binding`.
/// Returns the Varlist that owns the matching slot and the slot's
/// 0-based index.
pub fn resolve(pool: &StubPool, binding: StubId, symbol: StubId) -> Result<(StubId, usize), BindError> {
    let mut cursor = Some(binding);
    while let Some(id) = cursor {
        let stub = pool.get(id).map_err(|_| BindError::Unbound)?;
        match stub.flavor {
            StubFlavor::Varlist => {
                let keylist = varlist_keylist(pool, id).map_err(|_| BindError::Unbound)?;
                if let Ok(Some(idx)) = find_param_index(pool, keylist, symbol) {
                    return Ok((id, idx));
                }
                cursor = stub.misc;
            }
            StubFlavor::Use => {
                if let Some(varlist) = stub.link {
                    let keylist = varlist_keylist(pool, varlist).map_err(|_| BindError::Unbound)?;
                    if let Ok(Some(idx)) = find_param_index(pool, keylist, symbol) {
                        return Ok((varlist, idx));
                    }
                }
                cursor = stub.misc;
            }
            _ => return Err(BindError::Unbound),
        }
    }
    Err(BindError::Unbound)
}

/// Walk the binding chain looking for the first Object/Frame Varlist,
/// used by tweak's method-style "coupling" when a path step's `.member`
/// is evaluated inside a running function bound to an object (§4.5).
pub fn find_coupling(pool: &StubPool, binding: StubId) -> Option<StubId> {
    let mut cursor = Some(binding);
    while let Some(id) = cursor {
        let stub = pool.get(id).ok()?;
        match stub.flavor {
            StubFlavor::Varlist => {
                let kind = ren_value::context::varlist_kind(pool, id).ok()?;
                if matches!(kind, ContextKind::Object | ContextKind::Frame) {
                    return Some(id);
                }
                cursor = stub.misc;
            }
            StubFlavor::Use => cursor = stub.misc,
            _ => return None,
        }
    }
    None
}

/// Rewrite every Word cell reachable from `array`, recursing into nested
/// Block/Group arrays, to carry `target` as its binding (§4.6). Used when
/// an action dispatch instantiates a function body against a fresh frame:
/// `resolve` walks outward from `target` through its inherit chain, so
/// setting every word's binding to the same target is enough even though
/// most words in the body actually belong to an outer scope further down
/// that chain.
pub fn bind_deep(pool: &mut StubPool, array: StubId, target: StubId) {
    let mut worklist = vec![array];
    while let Some(current) = worklist.pop() {
        let len = match pool.get(current) {
            Ok(stub) => stub.content.as_cells().len(),
            Err(_) => continue,
        };
        for i in 0..len {
            let nested = {
                let Ok(stub) = pool.get_mut(current) else {
                    continue;
                };
                let Some(cell) = stub.content.as_cells_mut().get_mut(i) else {
                    continue;
                };
                match &mut cell.heart {
                    Heart::Word(word) => {
                        word.binding = Some(target);
                        None
                    }
                    Heart::Block(inner) | Heart::Group(inner) => Some(*inner),
                    _ => None,
                }
            };
            if let Some(inner) = nested {
                worklist.push(inner);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ren_value::context::make_varlist;
    use ren_value::param::{ParamClass, Typeset};
    use ren_value::paramlist::make_paramlist;
    use ren_value::{Cell, ParamDescriptor};

    #[test]
    fn resolve_finds_slot_through_a_use_extension() {
        let mut pool = StubPool::new();
        let sym = pool.make_stub(StubFlavor::Symbol, StubContent::Bytes(b"x".to_vec()));
        let keylist = make_paramlist(
            &mut pool,
            Cell::trash(),
            vec![ParamDescriptor::new(sym, ParamClass::Normal, Typeset::ANY)],
        );
        let frame = make_varlist(&mut pool, ContextKind::Frame, keylist, vec![Cell::integer(7)]);
        let lexical = make_use(&mut pool, frame, None);

        let (found_varlist, idx) = resolve(&pool, lexical, sym).unwrap();
        assert_eq!(found_varlist, frame);
        assert_eq!(idx, 0);
    }

    #[test]
    fn resolve_falls_back_through_inherit_chain() {
        let mut pool = StubPool::new();
        let sym_outer = pool.make_stub(StubFlavor::Symbol, StubContent::Bytes(b"y".to_vec()));
        let outer_keylist = make_paramlist(
            &mut pool,
            Cell::trash(),
            vec![ParamDescriptor::new(sym_outer, ParamClass::Normal, Typeset::ANY)],
        );
        let outer = make_varlist(&mut pool, ContextKind::Object, outer_keylist, vec![Cell::integer(1)]);

        let sym_inner = pool.make_stub(StubFlavor::Symbol, StubContent::Bytes(b"z".to_vec()));
        let inner_keylist = make_paramlist(
            &mut pool,
            Cell::trash(),
            vec![ParamDescriptor::new(sym_inner, ParamClass::Normal, Typeset::ANY)],
        );
        let inner = make_varlist(&mut pool, ContextKind::Frame, inner_keylist, vec![Cell::integer(2)]);
        pool.get_mut(inner).unwrap().misc = Some(outer);

        let (found, idx) = resolve(&pool, inner, sym_outer).unwrap();
        assert_eq!(found, outer);
        assert_eq!(idx, 0);
    }

    #[test]
    fn bind_deep_rewrites_words_in_nested_blocks() {
        use ren_value::{StubContent, StubFlavor};

        let mut pool = StubPool::new();
        let sym = pool.make_stub(StubFlavor::Symbol, StubContent::Bytes(b"x".to_vec()));
        let inner_block = pool.make_stub(
            StubFlavor::Source,
            StubContent::Dynamic(vec![Cell::word(sym)]),
        );
        let outer_block = pool.make_stub(
            StubFlavor::Source,
            StubContent::Dynamic(vec![Cell::block(inner_block)]),
        );
        let target = pool.make_stub(StubFlavor::Varlist, StubContent::Singular(Cell::trash()));

        bind_deep(&mut pool, outer_block, target);

        let rewritten = &pool.get(inner_block).unwrap().content.as_cells()[0];
        match &rewritten.heart {
            Heart::Word(w) => assert_eq!(w.binding, Some(target)),
            _ => panic!("expected word"),
        }
    }
}
