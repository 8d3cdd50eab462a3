//! End-to-end exercises of the Trampoline loop itself, independent of any
//! particular Executor implementation from `ren-actions`/`ren-interp`.

use ren_trampoline::{Bounce, Executor, Feed, HaltFlag, Level, Pending, Trampoline};
use ren_value::Cell;

#[derive(Debug)]
struct Immediate(i64);

impl Executor<()> for Immediate {
    fn step(&mut self, level: &mut Level<()>, _ctx: &mut ()) -> Bounce<()> {
        level.output = Cell::integer(self.0);
        Bounce::Out
    }
}

#[derive(Debug)]
struct PushesOneSublevel {
    pushed: bool,
}

impl Executor<()> for PushesOneSublevel {
    fn step(&mut self, level: &mut Level<()>, _ctx: &mut ()) -> Bounce<()> {
        if !self.pushed {
            self.pushed = true;
            let sub = Level::new(
                ren_trampoline::LevelId(0),
                Feed::from_cells(vec![]),
                Box::new(Immediate(7)),
            );
            return Bounce::ContinueSublevel(sub);
        }
        // resumed after the sub-level's Out landed in our output
        Bounce::Out
    }
}

#[test]
fn single_immediate_level_returns_its_output() {
    let mut tramp: Trampoline<()> = Trampoline::new();
    tramp.push_level(Feed::from_cells(vec![]), Box::new(Immediate(42)));
    let result = tramp.run(&mut ()).unwrap();
    assert_eq!(result, Cell::integer(42));
}

#[test]
fn sublevel_output_propagates_to_parent() {
    let mut tramp: Trampoline<()> = Trampoline::new();
    tramp.push_level(
        Feed::from_cells(vec![]),
        Box::new(PushesOneSublevel { pushed: false }),
    );
    let result = tramp.run(&mut ()).unwrap();
    assert_eq!(result, Cell::integer(7));
}

#[derive(Debug)]
struct DelegatesToSublevel {
    delegated: bool,
}

impl Executor<()> for DelegatesToSublevel {
    fn step(&mut self, level: &mut Level<()>, _ctx: &mut ()) -> Bounce<()> {
        if !self.delegated {
            self.delegated = true;
            let sub = Level::new(
                ren_trampoline::LevelId(0),
                Feed::from_cells(vec![]),
                Box::new(Immediate(99)),
            );
            return Bounce::DelegateSublevel(sub);
        }
        // A delegate's Out never comes back here, so reaching this branch
        // would mean the Trampoline mishandled delegation.
        level.output = Cell::integer(-1);
        Bounce::Out
    }
}

#[test]
fn delegate_sublevel_result_is_the_parents_result_without_resuming_it() {
    let mut tramp: Trampoline<()> = Trampoline::new();
    tramp.push_level(
        Feed::from_cells(vec![]),
        Box::new(DelegatesToSublevel { delegated: false }),
    );
    let result = tramp.run(&mut ()).unwrap();
    assert_eq!(result, Cell::integer(99));
}

#[derive(Debug)]
struct CatchesAnyThrow;

impl Executor<()> for CatchesAnyThrow {
    fn step(&mut self, level: &mut Level<()>, _ctx: &mut ()) -> Bounce<()> {
        match level.take_pending() {
            Some(Pending::Throw(throw)) => {
                level.output = throw.value;
                Bounce::Out
            }
            None => {
                let inner_id = ren_trampoline::LevelId(1);
                let sub = Level::new(inner_id, Feed::from_cells(vec![]), Box::new(ImmediatelyThrows));
                Bounce::ContinueSublevel(sub)
            }
        }
    }
}

#[derive(Debug)]
struct ImmediatelyThrows;

impl Executor<()> for ImmediatelyThrows {
    fn step(&mut self, _level: &mut Level<()>, _ctx: &mut ()) -> Bounce<()> {
        // Target LevelId(0): the first Level `Trampoline::new` ever
        // assigns, which is exactly the catcher pushed in the test below.
        Bounce::Thrown(ren_trampoline::Throw::new(
            None,
            Cell::integer(13),
            ren_trampoline::LevelId(0),
        ))
    }
}

#[test]
fn thrown_unwinds_to_its_target_level_and_is_handled() {
    let mut tramp: Trampoline<()> = Trampoline::new();
    tramp.push_level(Feed::from_cells(vec![]), Box::new(CatchesAnyThrow));
    let result = tramp.run(&mut ()).unwrap();
    assert_eq!(result, Cell::integer(13));
}

#[derive(Debug)]
struct CatchesHalt;

impl Executor<()> for CatchesHalt {
    fn step(&mut self, level: &mut Level<()>, _ctx: &mut ()) -> Bounce<()> {
        match level.take_pending() {
            Some(Pending::Throw(_halt)) => {
                level.output = Cell::integer(-99);
                Bounce::Out
            }
            None => Bounce::RedoChecked,
        }
    }
}

#[test]
fn halt_flag_injects_a_throw_at_the_next_step_boundary() {
    let mut tramp: Trampoline<()> = Trampoline::new();
    tramp.push_level(Feed::from_cells(vec![]), Box::new(CatchesHalt));
    // Mark the sole Level catchable so HALT has somewhere to land.
    {
        let level = tramp.top_mut().unwrap();
        level.catchable = true;
    }
    let halt: HaltFlag = tramp.halt_flag();
    halt.raise();
    let result = tramp.run(&mut ()).unwrap();
    assert_eq!(result, Cell::integer(-99));
}
