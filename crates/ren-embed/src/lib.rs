//! The narrow embedder API (§6): a struct-of-function-pointers
//! indirection in the source, so that extensions can call the core
//! without link-time symbol sharing. Re-expressed here as a plain Rust
//! trait implemented once for [`Interpreter`] — the "struct of plain
//! functions" Design Notes §9 calls for, minus the raw-pointer vtable a
//! C ABI needs and a safe Rust one doesn't.
//!
//! Variadic entry points in the source accept a heterogeneous pointer
//! stream (UTF-8 source text lexed on the fly, spliced Cells, Stub
//! instructions) discriminated by a leader byte (§4.1, §6, Design Notes
//! "Variadic ABI"). The lexer that would turn UTF-8 into Cells is out of
//! scope here (§1 Non-goals), so `run`/`elide`/`jumps` below take an
//! already-built Source array instead of a raw pointer stream — exactly
//! the restriction SPEC_FULL.md's `ren-cli` section documents: a caller
//! builds cells through the `make_*` constructors below and assembles
//! them into a block itself.

use ren_interp::{errors, InterpError, Interpreter};
use ren_value::heart::ActionRef;
use ren_value::{Cell, ContextKind, Heart, StubContent, StubFlavor, StubId, StubLeader};

/// `startup()`/`version()` (§6 Lifecycle). `shutdown` has no state to
/// release beyond dropping the `Interpreter` itself — Rust's ownership
/// does that for free, so it is modeled as consuming `self` rather than
/// taking a `clean: bool` flag the source uses to skip a final GC pass
/// on a crash exit.
pub fn startup() -> Interpreter {
    Interpreter::new()
}

/// `shutdown(clean)`: run a final collection pass when `clean` is true
/// (an ordinary exit) and skip it otherwise (the source's crash-exit
/// path, where a corrupt heap must not be swept). Consumes the handle;
/// there is nothing left to call after this.
pub fn shutdown(mut interp: Interpreter, clean: bool) {
    if clean {
        if let Err(err) = interp.collect() {
            tracing::warn!(target: "embed", error = %err, "final collection on shutdown failed");
        }
    }
    drop(interp);
}

/// `version(out[6])`: the crate's own semver components, padded to six
/// slots the way the source's version vector reserves trailing entries
/// for build metadata this workspace doesn't track.
pub fn version() -> [u32; 6] {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    let mut parts = VERSION.split('.').map(|p| p.parse::<u32>().unwrap_or(0));
    [
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        0,
        0,
        0,
    ]
}

/// `alloc_value() -> Cell*` (§6): wrap `value` in a singular, managed,
/// root-tagged Stub so it survives collection independent of any
/// container, and hand back the handle. Mirrors `rebValue`'s contract —
/// the handle stays alive until [`release`] clears the root flag.
pub fn alloc_value(interp: &mut Interpreter, value: Cell) -> Result<StubId, InterpError> {
    let id = interp
        .pool_mut()
        .make_stub(StubFlavor::Source, StubContent::Singular(value));
    interp.pool_mut().manage(id)?;
    interp.pool_mut().get_mut(id)?.leader.insert(StubLeader::ROOT);
    Ok(id)
}

/// `release(Cell*)` (§6): clear the root tag. The Stub remains managed
/// and is freed on the next collection that finds nothing else
/// reachable from it, exactly like any other managed Stub (§3, §4.2).
pub fn release(interp: &mut Interpreter, handle: StubId) -> Result<(), InterpError> {
    interp.pool_mut().get_mut(handle)?.leader.remove(StubLeader::ROOT);
    Ok(())
}

/// Read the value currently held by an `alloc_value` handle.
pub fn read_value(interp: &Interpreter, handle: StubId) -> Result<Cell, InterpError> {
    let stub = interp.pool().get(handle)?;
    Ok(stub.content.as_cells().first().cloned().unwrap_or_else(Cell::trash))
}

/// `alloc_bytes(n) -> void*` (§4.1, §6): a raw buffer backed by an
/// unmanaged Binary stub, recoverable later via [`repossess`] or
/// released outright via `free`.
pub fn alloc_bytes(interp: &mut Interpreter, size: usize) -> StubId {
    interp.pool_mut().alloc_bytes(size)
}

/// Write-through access to an `alloc_bytes` buffer's raw bytes, the
/// safe-Rust stand-in for writing through the source's `void*`.
pub fn bytes_mut(interp: &mut Interpreter, id: StubId) -> Result<&mut [u8], InterpError> {
    let stub = interp.pool_mut().get_mut(id)?;
    match &mut stub.content {
        StubContent::Bytes(buf) => Ok(buf.as_mut_slice()),
        _ => Err(InterpError::Value(ren_value::ValueError::NotRawBytes(id))),
    }
}

/// `free(void*)` (§6): release a raw `alloc_bytes` buffer that was never
/// repossessed into a value.
pub fn free_bytes(interp: &mut Interpreter, id: StubId) -> Result<(), InterpError> {
    Ok(interp.pool_mut().free_bytes(id)?)
}

/// `repossess(void*, n) -> Cell*` (§4.1, §6): reinterpret a raw
/// allocation as a Binary value, still unmanaged — the caller decides
/// whether to `manage` it or hand it straight to [`alloc_value`].
pub fn repossess(interp: &mut Interpreter, id: StubId, size: usize) -> Result<Cell, InterpError> {
    let id = interp.pool_mut().repossess(id, size)?;
    Ok(Cell::fundamental(Heart::Binary(id)))
}

// --- Construction (§6) ---------------------------------------------

pub fn make_integer(i: i64) -> Cell {
    Cell::integer(i)
}

pub fn make_logic(b: bool) -> Cell {
    Cell::logic(b)
}

pub fn make_char(c: char) -> Cell {
    Cell::char_(c)
}

pub fn make_decimal(d: f64) -> Cell {
    Cell::decimal(d)
}

pub fn make_text(interp: &mut Interpreter, text: &str) -> Cell {
    let id = interp
        .pool_mut()
        .make_stub(StubFlavor::String, StubContent::Bytes(text.as_bytes().to_vec()));
    let _ = interp.pool_mut().manage(id);
    Cell::fundamental(Heart::Text(id))
}

pub fn make_binary(interp: &mut Interpreter, bytes: &[u8]) -> Cell {
    let id = interp
        .pool_mut()
        .make_stub(StubFlavor::Binary, StubContent::Bytes(bytes.to_vec()));
    let _ = interp.pool_mut().manage(id);
    Cell::fundamental(Heart::Binary(id))
}

/// `make_word(sym)`: an unbound word cell over `spelling`. A caller
/// wanting a *bound* reference into the globals context should use
/// `Interpreter::global_word` instead (§4.6 binding is never implicit).
pub fn make_word(interp: &mut Interpreter, spelling: &str) -> Cell {
    let symbol = interp.intern(spelling.as_bytes());
    Cell::word(symbol)
}

/// `make_error(text)`: a definitional ERROR! context carrying `text` as
/// its `message` field (§7).
pub fn make_error(interp: &mut Interpreter, text: &str) -> Cell {
    let varlist = errors::make_error(interp, text);
    Cell::context(ContextKind::Error, varlist)
}

// --- Extraction (§6) -------------------------------------------------

pub fn unbox_integer(value: &Cell) -> Option<i64> {
    match value.heart {
        Heart::Integer(i) => Some(i),
        _ => None,
    }
}

pub fn unbox_decimal(value: &Cell) -> Option<f64> {
    match value.heart {
        Heart::Decimal(d) => Some(d),
        _ => None,
    }
}

pub fn unbox_char(value: &Cell) -> Option<char> {
    match value.heart {
        Heart::Char(c) => Some(c),
        _ => None,
    }
}

/// `spelling_of(cell, buf, bufsize) -> n`: the bound word's symbol
/// spelling. Returns an owned `String` in place of the source's
/// caller-provided buffer plus length-out-parameter pair.
pub fn spelling_of(interp: &Interpreter, value: &Cell) -> Option<String> {
    let Heart::Word(word) = &value.heart else { return None };
    let bytes = interp.spelling_of(word.spelling)?;
    Some(String::from_utf8_lossy(bytes).into_owned())
}

/// `bytes_of_binary(cell, buf, bufsize) -> n`.
pub fn bytes_of_binary(interp: &Interpreter, value: &Cell) -> Option<Vec<u8>> {
    let Heart::Binary(id) = value.heart else { return None };
    interp.pool().get(id).ok()?.content.as_bytes().map(|b| b.to_vec())
}

// --- Evaluation (§6) --------------------------------------------------

/// `run(variadic pointers...)`: evaluate `block` to completion and
/// return its result.
pub fn run(interp: &mut Interpreter, block: StubId) -> Result<Cell, InterpError> {
    interp.eval_block(block)
}

/// `elide(...)`: evaluate `block` purely for side effects, discarding
/// the result (the embedder never wants INVISIBLE's "nothing happened"
/// distinction surfaced past this boundary).
pub fn elide(interp: &mut Interpreter, block: StubId) -> Result<(), InterpError> {
    interp.eval_block(block).map(|_| ())
}

/// `jumps(...)` (§6): evaluate `block` under the expectation that it
/// never returns normally — it should throw, quit, or otherwise unwind.
/// Returns the unwind reason as an error; a plain successful result is
/// itself an error ([`InterpError::DidNotJump`]), mirroring the
/// source's documented caller contract.
pub fn jumps(interp: &mut Interpreter, block: StubId) -> InterpError {
    match interp.eval_block(block) {
        Ok(_) => InterpError::DidNotJump,
        Err(err) => err,
    }
}

/// `rescue(dangerous, opaque)` (§6, §7, §8 scenario 5).
pub fn rescue(interp: &mut Interpreter, dangerous: StubId) -> Cell {
    errors::rescue(interp, dangerous)
}

/// `rescue_with(dangerous, handler, opaque)` (§6): as [`rescue`], but on
/// failure `handler` is invoked with the ERROR! value instead of it
/// being returned directly.
pub fn rescue_with(
    interp: &mut Interpreter,
    dangerous: StubId,
    handler: ActionRef,
) -> Result<Cell, InterpError> {
    errors::rescue_with(interp, dangerous, handler)
}

// --- GC control (§6) ---------------------------------------------------

/// `halt()`: raise the process-wide HALT signal (§4.3 Cancellation).
pub fn halt(interp: &Interpreter) {
    interp.halt_flag().raise();
}

/// `manage(cell)`/`unmanage(cell)`: promote or demote a Stub's managed
/// flag directly, for a caller that built a handle by hand rather than
/// through [`alloc_value`] (§3 lifecycle: "promotion to managed is
/// explicit").
pub fn manage(interp: &mut Interpreter, id: StubId) -> Result<(), InterpError> {
    Ok(interp.pool_mut().manage(id)?)
}

pub fn unmanage(interp: &mut Interpreter, id: StubId) -> Result<(), InterpError> {
    Ok(interp.pool_mut().unmanage(id)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_value_survives_collection_until_released() {
        let mut interp = startup();
        let handle = alloc_value(&mut interp, make_integer(7)).unwrap();
        interp.collect().unwrap();
        assert_eq!(read_value(&interp, handle).unwrap(), Cell::integer(7));

        release(&mut interp, handle).unwrap();
        interp.collect().unwrap();
        assert!(read_value(&interp, handle).is_err(), "handle should be swept once unrooted");
    }

    #[test]
    fn alloc_bytes_repossess_round_trips_into_a_binary_value() {
        let mut interp = startup();
        let raw = alloc_bytes(&mut interp, 3);
        bytes_mut(&mut interp, raw).unwrap().copy_from_slice(&[9, 8, 7]);
        let value = repossess(&mut interp, raw, 3).unwrap();
        assert_eq!(bytes_of_binary(&interp, &value), Some(vec![9, 8, 7]));
    }

    #[test]
    fn unbox_helpers_match_their_constructors() {
        assert_eq!(unbox_integer(&make_integer(42)), Some(42));
        assert_eq!(unbox_decimal(&make_decimal(1.5)), Some(1.5));
        assert_eq!(unbox_char(&make_char('x')), Some('x'));
        assert_eq!(unbox_integer(&make_char('x')), None);
    }

    #[test]
    fn spelling_of_round_trips_a_made_word() {
        let mut interp = startup();
        let word = make_word(&mut interp, "frobnicate");
        assert_eq!(spelling_of(&interp, &word).as_deref(), Some("frobnicate"));
    }

    #[test]
    fn jumps_errors_on_a_plain_return_and_passes_through_a_real_throw() {
        let mut interp = startup();
        let one = interp
            .pool_mut()
            .make_stub(StubFlavor::Source, StubContent::Dynamic(vec![Cell::integer(1)]));
        let _ = interp.pool_mut().manage(one);
        assert!(matches!(jumps(&mut interp, one), InterpError::DidNotJump));

        interp.halt_flag().raise();
        let also_one = interp
            .pool_mut()
            .make_stub(StubFlavor::Source, StubContent::Dynamic(vec![Cell::integer(1)]));
        let _ = interp.pool_mut().manage(also_one);
        assert!(matches!(jumps(&mut interp, also_one), InterpError::Eval(_)));
    }

    #[test]
    fn rescue_turns_a_raise_into_an_error_value() {
        let mut interp = startup();
        let raise_word = interp.global_word(b"raise");
        let text = make_text(&mut interp, "bad");
        let dangerous = interp
            .pool_mut()
            .make_stub(StubFlavor::Source, StubContent::Dynamic(vec![raise_word, text]));
        let _ = interp.pool_mut().manage(dangerous);

        let result = rescue(&mut interp, dangerous);
        assert!(matches!(result.heart, Heart::Context(ContextKind::Error, _)));
    }

    #[test]
    fn version_reports_a_parsed_semver_triplet() {
        let v = version();
        assert_eq!(v[3..], [0, 0, 0]);
    }
}
