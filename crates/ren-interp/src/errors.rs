//! ERROR! construction and the `rescue`/`rescue_with` boundary (§6, §7).
//! Every ERROR! carries a message, a file+line, and a near-context; here
//! that is a three-key Varlist (`message`, `file`, `near`) tagged
//! `ContextKind::Error`, built the same way any other object is.

use ren_value::context::make_varlist;
use ren_value::param::{ParamClass, Typeset};
use ren_value::paramlist::make_paramlist;
use ren_value::{Cell, ContextKind, ParamDescriptor, StubId};

use crate::interpreter::Interpreter;

/// Build a definitional ERROR! antiform carrying `message`. `file`/`near`
/// are filled with `none` placeholders — the CLI's literal scenarios
/// never run through a file, so there is nothing meaningful to put there
/// yet; a future lexer/loader would populate them from source position.
pub fn make_error(interp: &mut Interpreter, message: &str) -> StubId {
    let sym_message = interp.canon.intern(&mut interp.pool, b"message");
    let sym_file = interp.canon.intern(&mut interp.pool, b"file");
    let sym_near = interp.canon.intern(&mut interp.pool, b"near");
    let keylist = make_paramlist(
        &mut interp.pool,
        Cell::trash(),
        vec![
            ParamDescriptor::new(sym_message, ParamClass::Normal, Typeset::ANY),
            ParamDescriptor::new(sym_file, ParamClass::Normal, Typeset::ANY),
            ParamDescriptor::new(sym_near, ParamClass::Normal, Typeset::ANY),
        ],
    );
    let text = interp
        .pool
        .make_stub(ren_value::StubFlavor::String, ren_value::StubContent::Bytes(message.as_bytes().to_vec()));
    make_varlist(
        &mut interp.pool,
        ContextKind::Error,
        keylist,
        vec![Cell::fundamental(ren_value::Heart::Text(text)), Cell::null(), Cell::null()],
    )
}

/// The text an ERROR! built at a `rescue` boundary carries as its
/// `message` field. An `EvalError::Message` (the shape a `raise` native
/// produces) is unwrapped to its own text rather than the outer
/// `InterpError::Eval` wrapper's, so `raise user-error "bad"` rescues to
/// a message of exactly `"bad"`, not `"evaluation failed: bad"`.
fn describe(err: &crate::error::InterpError) -> String {
    match err {
        crate::error::InterpError::Eval(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

/// `rescue(dangerous)` (§6, §7): run `dangerous` (a body block) as a
/// top-level evaluation; any abrupt failure or uncaught throw that
/// reaches the boundary is converted into a raised ERROR! instead of
/// propagating further, and the Trampoline continues.
pub fn rescue(interp: &mut Interpreter, dangerous: StubId) -> Cell {
    match interp.eval_block(dangerous) {
        Ok(value) => value,
        Err(err) => {
            let error_varlist = make_error(interp, &describe(&err));
            Cell::context(ContextKind::Error, error_varlist)
        }
    }
}

/// `rescue_with(dangerous, handler)` (§6): as [`rescue`], but on failure
/// the handler action is invoked with the ERROR! value instead of it
/// being returned directly.
pub fn rescue_with(interp: &mut Interpreter, dangerous: StubId, handler: ren_value::heart::ActionRef) -> Result<Cell, crate::error::InterpError> {
    match interp.eval_block(dangerous) {
        Ok(value) => Ok(value),
        Err(err) => {
            let error_varlist = make_error(interp, &describe(&err));
            let error_value = Cell::context(ContextKind::Error, error_varlist);
            interp.call(handler, vec![error_value])
        }
    }
}
