//! Scripted debug controller.
//!
//! Test scripts carry breakpoint annotations such as
//! `/**bp(name):locals(1);stack()**/`. The [`debugger::Controller`] finds
//! them when a script compiles, registers breakpoints with a
//! [`engine::DebugEngine`], runs the annotation's commands whenever the
//! debuggee pauses, and records the results in an event log that can be
//! diffed against a baseline.

pub mod config;
pub mod debugger;
pub mod engine;
pub mod error;
pub mod executor;
pub mod output;
pub mod parser;
pub mod replay;
