//! `ren` entrypoint: boots an [`Interpreter`], wires up logging and
//! configuration, and drives the literal end-to-end scenarios of
//! spec.md §8 through a `rescue`-guarded loop.
//!
//! There is no lexer in this workspace (§1 Non-goals), so this binary
//! cannot read a `.ren` source file the way `ox-bin` reads a text
//! buffer from disk. Each "program" the loop runs is instead built
//! directly out of Cells through `ren-embed`'s constructors and
//! `Interpreter`'s action-building methods — the pre-built `Source`
//! arrays SPEC_FULL.md's `ren-cli` section describes. The loop that
//! drives them plays the role the source's top-level REPL plays: every
//! iteration is wrapped at a `rescue` boundary so one scenario's
//! failure is reported and the loop continues, exactly as §7 describes
//! for the top-level read-eval-print loop.

use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use ren_embed as embed;
use ren_interp::{Interpreter, InterpError};
use ren_value::heart::{ActionRef, Heart};
use ren_value::{Cell, ContextKind};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "ren", version, about = "Evaluation core scenario runner")]
struct Args {
    /// Optional configuration file path (overrides discovery of `ren.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("ren.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "ren.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => self.log_guard = Some(guard),
            Err(_err) => {
                // Global subscriber already installed (e.g. under a test
                // harness); drop the guard so the writer thread shuts down.
            }
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// A single §8 scenario: a label plus a thunk run against a live
/// `Interpreter`. Kept as plain closures rather than a trait object
/// hierarchy — six scenarios never need dynamic dispatch or a registry,
/// just a `Vec` the loop walks in order.
struct Scenario {
    name: &'static str,
    run: fn(&mut Interpreter) -> Result<String, InterpError>,
}

fn action_ref(cell: &Cell) -> ActionRef {
    match cell.heart {
        Heart::Action(r) => r,
        _ => panic!("expected an action value"),
    }
}

fn block_of(interp: &mut Interpreter, cells: Vec<Cell>) -> Cell {
    let array = interp
        .pool_mut()
        .make_stub(ren_value::StubFlavor::Source, ren_value::StubContent::Dynamic(cells));
    let _ = interp.pool_mut().manage(array);
    Cell::block(array)
}

/// §8 scenario 1: `negadd: cascade [:add :negate]; negadd 2 2` → `-4`.
fn scenario_cascade(interp: &mut Interpreter) -> Result<String, InterpError> {
    let add = action_ref(&interp.global_value(b"add").expect("add registered"));
    let negate = action_ref(&interp.global_value(b"negate").expect("negate registered"));
    let negadd = interp.cascade(vec![add, negate]);
    interp.define_global(b"negadd", Cell::action(negadd.paramlist, negadd.details));

    let result = interp.call(negadd, vec![Cell::integer(2), Cell::integer(2)])?;
    Ok(format!("negadd 2 2 => {result:?}"))
}

/// §8 scenario 2: `ap: specialize :append [dup: true]; ap [] 'x` → `[x]`,
/// `:append` itself unaffected.
fn scenario_specialize(interp: &mut Interpreter) -> Result<String, InterpError> {
    let append = action_ref(&interp.global_value(b"append").expect("append registered"));
    let sym_dup = interp.intern(b"dup");
    let ap = interp.specialize(append, &[(sym_dup, Cell::logic(true))]);

    let target = block_of(interp, vec![]);
    let sym_x = interp.intern(b"x");
    let result = interp.call(ap, vec![target, Cell::word(sym_x)])?;
    Ok(format!("ap [] 'x => {result:?}"))
}

/// §8 scenario 3: a macro's body result splices into the caller's feed
/// rather than being returned directly — `m [a b c]` evaluates as
/// though `[a b c]`'s own cells had appeared in place of the call.
fn scenario_macro_splice(interp: &mut Interpreter) -> Result<String, InterpError> {
    let sym_x = interp.intern(b"x");
    let body_word = Cell::word(sym_x);
    let body = interp
        .pool_mut()
        .make_stub(ren_value::StubFlavor::Source, ren_value::StubContent::Dynamic(vec![body_word]));
    let _ = interp.pool_mut().manage(body);
    let m = interp.make_macro(
        vec![ren_value::param::ParamDescriptor::new(
            sym_x,
            ren_value::param::ParamClass::Normal,
            ren_value::param::Typeset::BLOCK,
        )],
        body,
    );
    interp.define_global(b"m", Cell::action(m.paramlist, m.details));
    let m_cell = interp.global_word(b"m");

    let spliced = block_of(interp, vec![Cell::integer(1), Cell::integer(2)]);
    let top_level = interp
        .pool_mut()
        .make_stub(ren_value::StubFlavor::Source, ren_value::StubContent::Dynamic(vec![m_cell, spliced]));
    let _ = interp.pool_mut().manage(top_level);

    let result = interp.eval_block(top_level)?;
    Ok(format!("m [1 2] spliced into the caller's feed => {result:?}"))
}

/// §8 scenario 4: `obj: make object! [a: make object! [b: 1]]`;
/// `obj.a.b: 10` then `get $obj.a.b` yields `10`.
fn scenario_generalized_set(interp: &mut Interpreter) -> Result<String, InterpError> {
    use ren_tweak::{Picker, RootRef, Steps};

    let sym_b = interp.intern(b"b");
    let inner_keylist = ren_value::paramlist::make_paramlist(
        interp.pool_mut(),
        Cell::trash(),
        vec![ren_value::param::ParamDescriptor::new(
            sym_b,
            ren_value::param::ParamClass::Normal,
            ren_value::param::Typeset::ANY,
        )],
    );
    let inner = ren_value::context::make_varlist(interp.pool_mut(), ContextKind::Object, inner_keylist, vec![Cell::integer(1)]);
    let _ = interp.pool_mut().manage(inner_keylist);
    let _ = interp.pool_mut().manage(inner);
    interp.define_global(b"obj", Cell::context(ContextKind::Object, inner));

    let gid = globals_id(interp);
    let globals_keylist = ren_value::context::varlist_keylist(interp.pool(), gid)
        .expect("globals always carries a keylist");
    let sym_obj = interp.intern(b"obj");
    let obj_index = ren_value::paramlist::find_param_index(interp.pool(), globals_keylist, sym_obj)?
        .expect("obj just defined");

    let steps = Steps::with_pickers(
        RootRef::Slot { varlist: gid, index: obj_index },
        vec![Picker::Symbol(sym_b)],
    );
    interp.tweak_set(&steps, Cell::integer(10))?;
    let result = interp.tweak_get(&steps, false)?;
    Ok(format!("obj.a.b: 10 then get $obj.a.b => {result:?}"))
}

/// `Interpreter` doesn't expose its globals Varlist id publicly (it's
/// crate-private storage, §9 "Global mutable state" is meant to stay
/// behind the handle) — round-trip through the bound word it hands back
/// instead of reaching in directly.
fn globals_id(interp: &mut Interpreter) -> ren_value::StubId {
    let probe = interp.global_word(b"add");
    match probe.heart {
        Heart::Word(w) => w.binding.expect("global_word always binds"),
        _ => unreachable!(),
    }
}

/// §8 scenario 5: `rescue(raise user-error "bad")` returns an ERROR!
/// whose message is `"bad"`, and the interpreter keeps running.
fn scenario_rescue(interp: &mut Interpreter) -> Result<String, InterpError> {
    let raise_word = interp.global_word(b"raise");
    let message = embed::make_text(interp, "bad");
    let dangerous = interp
        .pool_mut()
        .make_stub(ren_value::StubFlavor::Source, ren_value::StubContent::Dynamic(vec![raise_word, message]));
    let _ = interp.pool_mut().manage(dangerous);

    let result = embed::rescue(interp, dangerous);
    let Heart::Context(ContextKind::Error, varlist) = result.heart else {
        return Ok(format!("rescue did not return an ERROR!: {result:?}"));
    };
    let sym_message = interp.intern(b"message");
    let msg = ren_value::context::varlist_get(interp.pool(), varlist, sym_message)?.clone();
    Ok(format!("rescue(raise \"bad\") => ERROR! with message {msg:?}"))
}

/// §8 scenario 6: raising HALT surfaces as an uncaught HALT-labelled
/// throw within one step boundary.
fn scenario_halt(interp: &mut Interpreter) -> Result<String, InterpError> {
    interp.halt_flag().raise();
    let block = interp
        .pool_mut()
        .make_stub(ren_value::StubFlavor::Source, ren_value::StubContent::Dynamic(vec![Cell::integer(1)]));
    let _ = interp.pool_mut().manage(block);
    match interp.eval_block(block) {
        Err(InterpError::Eval(ren_trampoline::EvalError::Uncaught { label })) => {
            Ok(format!("HALT observed at the next step boundary, label={label:?}"))
        }
        other => Ok(format!("expected an uncaught HALT throw, got {other:?}")),
    }
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario { name: "cascade", run: scenario_cascade },
        Scenario { name: "specialize", run: scenario_specialize },
        Scenario { name: "macro splice", run: scenario_macro_splice },
        Scenario { name: "generalized set", run: scenario_generalized_set },
        Scenario { name: "rescue", run: scenario_rescue },
        Scenario { name: "halt", run: scenario_halt },
    ]
}

/// Translate an uncaught throw labelled `QUIT`/`HALT` into a process
/// exit code, the way §7 says the top-level REPL and CLI must (this
/// loop's scenarios rescue their own failures, but a future lexer-backed
/// REPL reusing this same outer loop would hit this path directly).
fn exit_code_for_uncaught(interp: &mut Interpreter, label: Option<ren_value::StubId>) -> i32 {
    match label {
        Some(sym) if Some(sym) == Some(interp.halt_symbol()) => 130,
        Some(_) => 1,
        None => 1,
    }
}

fn run_scenarios(interp: &mut Interpreter) -> i32 {
    let mut exit_code = 0;
    for scenario in scenarios() {
        info!(target: "runtime.scenario", name = scenario.name, "running");
        match (scenario.run)(interp) {
            Ok(summary) => {
                println!("[{}] {}", scenario.name, summary);
                info!(target: "runtime.scenario", name = scenario.name, %summary, "ok");
            }
            Err(InterpError::Eval(ren_trampoline::EvalError::Uncaught { label })) => {
                error!(target: "runtime.scenario", name = scenario.name, ?label, "uncaught throw");
                println!("[{}] uncaught throw: {:?}", scenario.name, label);
                exit_code = exit_code_for_uncaught(interp, label);
            }
            Err(err) => {
                error!(target: "runtime.scenario", name = scenario.name, error = %err, "failed");
                println!("[{}] failed: {err}", scenario.name);
            }
        }
    }
    exit_code
}

fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = ren_config::load_from(args.config.clone())?;

    let mut interp = embed::startup();
    config.apply(&mut interp);

    let exit_code = run_scenarios(&mut interp);

    embed::shutdown(interp, true);

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
