//! Native action registration (§4.4 Action variants: "Raw-Native (C
//! function)") plus the generic-dispatch implementations §4.4 calls out
//! by name — APPEND, COPY, PICK — keyed by the first argument's heart
//! tag. Registered once at `Interpreter::new` time so the literal
//! scenarios of §8 and `ren-cli` have something to build calls against
//! without a lexer.

use ren_actions::dispatcher::Dispatcher;
use ren_actions::error::ActionError;
use ren_actions::generic::GenericOp;
use ren_value::heart::Heart;
use ren_value::param::{ParamClass, ParamDescriptor, Typeset};
use ren_value::{Cell, HeartTag, StubContent, StubFlavor};

use crate::interpreter::Interpreter;

fn native_add(_: &mut Interpreter, args: &[Cell]) -> Result<Cell, ActionError> {
    match (args.first().map(|c| &c.heart), args.get(1).map(|c| &c.heart)) {
        (Some(Heart::Integer(a)), Some(Heart::Integer(b))) => Ok(Cell::integer(a + b)),
        (Some(Heart::Decimal(a)), Some(Heart::Decimal(b))) => Ok(Cell::decimal(a + b)),
        _ => Err(ActionError::TypeMismatch),
    }
}

fn native_negate(_: &mut Interpreter, args: &[Cell]) -> Result<Cell, ActionError> {
    match args.first().map(|c| &c.heart) {
        Some(Heart::Integer(x)) => Ok(Cell::integer(-x)),
        Some(Heart::Decimal(x)) => Ok(Cell::decimal(-x)),
        _ => Err(ActionError::TypeMismatch),
    }
}

fn native_not(_: &mut Interpreter, args: &[Cell]) -> Result<Cell, ActionError> {
    Ok(Cell::logic(!args.first().map(Cell::is_truthy).unwrap_or(false)))
}

/// `raise user-error "bad"` (§7, §8 scenario 5): a definitional error is
/// born here as an abrupt failure (`ActionError::Raised`) — only
/// `ren-interp::errors::rescue`'s boundary knows how to turn the message
/// text into a full ERROR! context, so this native stays ignorant of
/// `Varlist`/`ContextKind` entirely.
fn native_raise(interp: &mut Interpreter, args: &[Cell]) -> Result<Cell, ActionError> {
    let message = match args.first().map(|c| &c.heart) {
        Some(Heart::Text(stub)) => interp
            .pool
            .get(*stub)?
            .content
            .as_bytes()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default(),
        _ => return Err(ActionError::TypeMismatch),
    };
    Err(ActionError::Raised(message))
}

/// APPEND on a `block!` (§4.4 "Generic dispatch"): mutates the target
/// array in place and returns the same series cell, the way Rebol's
/// APPEND does. `dup` (a refinement, §8 scenario 2) is gathered but not
/// otherwise consulted — without an accompanying count parameter this
/// core's APPEND has nothing to multiply the value by, so `dup: true`
/// degrades to a plain single append, which is exactly what scenario 2
/// expects back out of a `specialize`d call.
fn generic_append_block(interp: &mut Interpreter, args: &[Cell]) -> Result<Cell, ActionError> {
    let series = args.first().ok_or(ActionError::EndOfFeed)?;
    let Heart::Block(array) = series.heart else {
        return Err(ActionError::TypeMismatch);
    };
    let value = args.get(1).cloned().unwrap_or_else(Cell::trash);
    if value.is_antiform() {
        return Err(ActionError::Unsupported("cannot append an antiform into a block"));
    }
    let stub = interp.pool.get_mut(array)?;
    match &mut stub.content {
        StubContent::Dynamic(cells) => cells.push(value),
        _ => return Err(ActionError::Unsupported("append target is not a growable array")),
    }
    Ok(series.clone())
}

/// COPY on a `block!`: a fresh, unmanaged-then-managed Source stub
/// holding a clone of the original's cells, per §4.4's "Generic
/// dispatch" list.
fn generic_copy_block(interp: &mut Interpreter, args: &[Cell]) -> Result<Cell, ActionError> {
    let series = args.first().ok_or(ActionError::EndOfFeed)?;
    let Heart::Block(array) = series.heart else {
        return Err(ActionError::TypeMismatch);
    };
    let cells = interp.pool.get(array)?.content.as_cells().to_vec();
    let copy = interp.pool.make_stub(StubFlavor::Source, StubContent::Dynamic(cells));
    interp.pool.manage(copy)?;
    Ok(Cell::block(copy))
}

/// PICK on a `block!`: 1-based index, returning the antiform null for an
/// out-of-range index rather than failing — PICK's result never lands
/// back inside a Source array, so an antiform in its *output* is fine
/// even though one could never be stored into the block itself (§3).
fn generic_pick_block(interp: &mut Interpreter, args: &[Cell]) -> Result<Cell, ActionError> {
    let series = args.first().ok_or(ActionError::EndOfFeed)?;
    let Heart::Block(array) = series.heart else {
        return Err(ActionError::TypeMismatch);
    };
    let Some(Heart::Integer(index)) = args.get(1).map(|c| &c.heart) else {
        return Err(ActionError::TypeMismatch);
    };
    let Ok(zero_based) = usize::try_from(index - 1) else {
        return Ok(Cell::null());
    };
    let cells = interp.pool.get(array)?.content.as_cells();
    Ok(cells.get(zero_based).cloned().unwrap_or_else(Cell::null))
}

/// Register every native action and generic implementation this crate
/// ships with, and bind each under its everyday name in `globals` so a
/// caller building cells through the embedder API (`ren-embed`) can refer
/// to them by a bound word exactly as `ren-cli`'s literal scenarios do.
pub fn register_natives(interp: &mut Interpreter) {
    let sym_a = interp.intern(b"a");
    let sym_b = interp.intern(b"b");
    let add = interp.make_native(
        vec![
            ParamDescriptor::new(sym_a, ParamClass::Normal, Typeset::INTEGER | Typeset::DECIMAL),
            ParamDescriptor::new(sym_b, ParamClass::Normal, Typeset::INTEGER | Typeset::DECIMAL),
        ],
        Dispatcher::RawNative(native_add),
    );
    interp.define_global(b"add", Cell::action(add.paramlist, add.details));

    let sym_x = interp.intern(b"x");
    let negate = interp.make_native(
        vec![ParamDescriptor::new(sym_x, ParamClass::Normal, Typeset::INTEGER | Typeset::DECIMAL)],
        Dispatcher::RawNative(native_negate),
    );
    interp.define_global(b"negate", Cell::action(negate.paramlist, negate.details));

    let sym_v = interp.intern(b"value");
    let not_ = interp.make_native(
        vec![ParamDescriptor::new(sym_v, ParamClass::Normal, Typeset::ANY)],
        Dispatcher::RawNative(native_not),
    );
    interp.define_global(b"not", Cell::action(not_.paramlist, not_.details));

    let sym_message = interp.intern(b"message");
    let raise = interp.make_native(
        vec![ParamDescriptor::new(sym_message, ParamClass::Normal, Typeset::TEXT)],
        Dispatcher::RawNative(native_raise),
    );
    interp.define_global(b"raise", Cell::action(raise.paramlist, raise.details));

    let sym_series = interp.intern(b"series");
    let sym_value = interp.intern(b"value");
    let sym_dup = interp.intern(b"dup");
    let append = interp.make_native(
        vec![
            ParamDescriptor::new(sym_series, ParamClass::Normal, Typeset::BLOCK),
            ParamDescriptor::new(sym_value, ParamClass::Normal, Typeset::ANY),
            ParamDescriptor::new(sym_dup, ParamClass::Refinement, Typeset::LOGIC),
        ],
        Dispatcher::Generic(GenericOp::Append),
    );
    interp.define_global(b"append", Cell::action(append.paramlist, append.details));
    interp.register_generic(GenericOp::Append, HeartTag::Block, generic_append_block);

    let copy = interp.make_native(
        vec![ParamDescriptor::new(sym_series, ParamClass::Normal, Typeset::BLOCK)],
        Dispatcher::Generic(GenericOp::Copy),
    );
    interp.define_global(b"copy", Cell::action(copy.paramlist, copy.details));
    interp.register_generic(GenericOp::Copy, HeartTag::Block, generic_copy_block);

    let sym_index = interp.intern(b"index");
    let pick = interp.make_native(
        vec![
            ParamDescriptor::new(sym_series, ParamClass::Normal, Typeset::BLOCK),
            ParamDescriptor::new(sym_index, ParamClass::Normal, Typeset::INTEGER),
        ],
        Dispatcher::Generic(GenericOp::Pick),
    );
    interp.define_global(b"pick", Cell::action(pick.paramlist, pick.details));
    interp.register_generic(GenericOp::Pick, HeartTag::Block, generic_pick_block);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ren_value::{ContextKind, StubContent, StubFlavor};

    fn block_of(interp: &mut Interpreter, cells: Vec<Cell>) -> Cell {
        let array = interp.pool.make_stub(StubFlavor::Source, StubContent::Dynamic(cells));
        let _ = interp.pool.manage(array);
        Cell::block(array)
    }

    /// `add 2 2` by direct call, exercising native registration end to
    /// end (the same dispatcher `negadd`'s first stage uses in the
    /// cascade scenario, §8 scenario 1).
    #[test]
    fn add_native_sums_two_integers() {
        let mut interp = Interpreter::new();
        let add = interp.global_value(b"add").expect("add registered");
        let Heart::Action(add_ref) = add.heart else { panic!("add is not an action") };
        let result = interp.call(add_ref, vec![Cell::integer(2), Cell::integer(2)]).unwrap();
        assert_eq!(result, Cell::integer(4));
    }

    /// `ap: specialize :append [dup: true]; ap [] 'x` returns `[x]`,
    /// while `:append` itself is unaffected (§8 scenario 2).
    #[test]
    fn specialized_append_with_dup_still_appends_once_and_leaves_append_unchanged() {
        let mut interp = Interpreter::new();
        let append = interp.global_value(b"append").expect("append registered");
        let Heart::Action(append_ref) = append.heart else { panic!("append is not an action") };
        let sym_dup = interp.intern(b"dup");
        let ap = interp.specialize(append_ref, &[(sym_dup, Cell::logic(true))]);

        let empty_block = block_of(&mut interp, vec![]);
        let Heart::Block(empty_array) = empty_block.heart else { unreachable!() };
        let sym_x = interp.intern(b"x");
        let result = interp.call(ap, vec![empty_block.clone(), Cell::word(sym_x)]).unwrap();

        let Heart::Block(result_array) = result.heart else { panic!("expected a block back") };
        assert_eq!(result_array, empty_array, "append mutates and returns the same series");
        let cells = interp.pool.get(result_array).unwrap().content.as_cells().to_vec();
        assert_eq!(cells, vec![Cell::word(sym_x)]);

        // :append is untouched — calling it directly still requires all
        // three parameters and does not carry the `dup` override.
        let other_block = block_of(&mut interp, vec![]);
        let sym_y = interp.intern(b"y");
        let direct = interp
            .call(append_ref, vec![other_block, Cell::word(sym_y), Cell::logic(false)])
            .unwrap();
        let Heart::Block(other_array) = direct.heart else { panic!("expected a block back") };
        let other_cells = interp.pool.get(other_array).unwrap().content.as_cells().to_vec();
        assert_eq!(other_cells, vec![Cell::word(sym_y)]);
    }

    /// A macro's body result is spliced into the caller's feed rather
    /// than returned directly (§4.4 Macro/Inliner, §8 scenario 3): a
    /// one-parameter macro whose body evaluates to its own argument
    /// splices that block's cells in, and the block that called it
    /// evaluates to the spliced block's *last* cell rather than the
    /// macro's own non-result.
    #[test]
    fn macro_splices_its_result_into_the_calling_feed() {
        let mut interp = Interpreter::new();
        let sym_x = interp.intern(b"x");
        let body_word = ren_value::Cell::word(sym_x);
        let body = interp
            .pool
            .make_stub(StubFlavor::Source, StubContent::Dynamic(vec![body_word]));
        let _ = interp.pool.manage(body);
        let m = interp.make_macro(
            vec![ParamDescriptor::new(sym_x, ParamClass::Normal, Typeset::BLOCK)],
            body,
        );
        interp.define_global(b"m", Cell::action(m.paramlist, m.details));
        let m_cell = interp.global_word(b"m");

        let spliced_contents = block_of(&mut interp, vec![Cell::integer(1), Cell::integer(2)]);
        let top_level = interp
            .pool
            .make_stub(StubFlavor::Source, StubContent::Dynamic(vec![m_cell, spliced_contents]));
        let _ = interp.pool.manage(top_level);

        let result = interp.eval_block(top_level).unwrap();
        assert_eq!(result, Cell::integer(2));
        let _ = ContextKind::Object; // kept for symmetry with other tests' imports
    }

    /// `rescue(raise "bad")` returns an ERROR! whose message is `"bad"`,
    /// and the interpreter keeps running afterward (§8 scenario 5).
    #[test]
    fn rescue_catches_raise_and_returns_an_error_with_its_message() {
        let mut interp = Interpreter::new();
        let raise_word = interp.global_word(b"raise");
        let text = interp
            .pool
            .make_stub(StubFlavor::String, StubContent::Bytes(b"bad".to_vec()));
        let message = Cell::fundamental(Heart::Text(text));
        let dangerous = interp
            .pool
            .make_stub(StubFlavor::Source, StubContent::Dynamic(vec![raise_word, message]));
        let _ = interp.pool.manage(dangerous);

        let result = crate::errors::rescue(&mut interp, dangerous);
        let Heart::Context(ContextKind::Error, varlist) = result.heart else {
            panic!("expected an ERROR! context back, got {:?}", result.heart)
        };
        let sym_message = interp.intern(b"message");
        let msg_cell = ren_value::context::varlist_get(&interp.pool, varlist, sym_message).unwrap();
        let Heart::Text(stub) = msg_cell.heart else { panic!("message field is not text!") };
        assert_eq!(interp.pool.get(stub).unwrap().content.as_bytes(), Some(b"bad".as_slice()));

        // The trampoline is empty again — the interpreter keeps running.
        let sanity = interp.call(
            {
                let add = interp.global_value(b"add").unwrap();
                let Heart::Action(r) = add.heart else { unreachable!() };
                r
            },
            vec![Cell::integer(1), Cell::integer(1)],
        );
        assert_eq!(sanity.unwrap(), Cell::integer(2));
    }

    /// Raising the process-wide HALT flag surfaces as an uncaught throw
    /// labelled `HALT`, reported within the very next step boundary — no
    /// Level ever actually runs (§4.3 Cancellation, §8 scenario 6).
    #[test]
    fn halt_flag_produces_an_uncaught_halt_labelled_throw() {
        let mut interp = Interpreter::new();
        interp.halt_flag().raise();
        let block = interp
            .pool
            .make_stub(StubFlavor::Source, StubContent::Dynamic(vec![Cell::integer(1)]));
        let _ = interp.pool.manage(block);
        let err = interp.eval_block(block).unwrap_err();
        match err {
            crate::error::InterpError::Eval(ren_trampoline::EvalError::Uncaught { label }) => {
                assert_eq!(label, Some(interp.halt_symbol()));
            }
            other => panic!("expected an uncaught HALT throw, got {other:?}"),
        }
    }
}
