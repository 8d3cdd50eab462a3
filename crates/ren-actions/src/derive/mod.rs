//! Action derivations (§4.4): each one builds a new action out of an
//! existing one, sharing the same call ABI. Specialize, Adapt, Enclose
//! and Macro are short enough to live as `Dispatcher` branches handled
//! inline by `ActionExecutor`; Cascade needs its own small state machine
//! because it re-enters a sub-Level once per pipeline stage, so it gets
//! a module of its own.

pub mod cascade;
