use super::queue::{Completion, Handler};
use crate::config::TraceFlags;
use crate::debugger::{BreakpointId, Controller, PauseContext};
use crate::engine::DebugEngine;
use crate::error::CommandError;
use crate::parser::parse_script;

/// Substring that makes a command text fire only once.
pub const RUN_ONCE_MARKER: &str = "removeExpr()";

/// Commands run at a `debugger;` statement.
pub const DEBUGGER_STATEMENT_COMMANDS: &str = "dumpBreak();locals();stack();";

/// Why the debuggee stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseSource {
    /// Breakpoint hit or step complete; `None` when no breakpoint is involved.
    Breakpoint(Option<u32>),
    DebuggerStatement,
    AsyncBreak,
    Exception,
}

/// Runs one pause from start to finish.
///
/// A fresh [`PauseContext`] is pushed, the command text for `source` is
/// resolved and queued, and the queue is drained. If nothing resumed, the
/// context is reset to the resumed state before it is popped.
pub fn handle_pause<E: DebugEngine>(ctl: &mut Controller<E>, source: PauseSource) {
    ctl.pauses.push(PauseContext::new());
    let depth = ctl.pauses.len();

    let text = resolve_command_text(ctl, source);
    ctl.trace_line(TraceFlags::INTERNAL_FUNCTIONS, || {
        format!("handlePause {source:?} (depth {depth}) commands: {text:?}")
    });
    if let Some(text) = text {
        queue_script(ctl, &text);
    }

    drain(ctl);

    if let Some(pause) = ctl.pauses.last_mut() {
        if !pause.resumed {
            pause.mark_resumed();
        }
    }
    if let Some(pause) = ctl.pauses.pop() {
        if !pause.queue.is_empty() {
            tracing::debug!(dropped = pause.queue.len(), "commands left after resume");
        }
    }
}

fn resolve_command_text<E: DebugEngine>(
    ctl: &mut Controller<E>,
    source: PauseSource,
) -> Option<String> {
    match source {
        PauseSource::Breakpoint(None) => None,
        PauseSource::Breakpoint(Some(engine_id)) => {
            let id = BreakpointId::Engine(engine_id);
            let text = match ctl.breakpoints.command_text(id).map(|t| t.map(str::to_string)) {
                Ok(text) => text,
                Err(err) => {
                    ctl.report(&err);
                    return None;
                }
            };
            if text.as_deref().is_some_and(is_run_once) {
                // The breakpoint stays live in the engine; later hits resolve to nothing.
                if let Err(err) = ctl.breakpoints.set_command_text(id, None) {
                    ctl.report(&err);
                }
            }
            text
        }
        PauseSource::DebuggerStatement => Some(DEBUGGER_STATEMENT_COMMANDS.to_string()),
        PauseSource::AsyncBreak => take_run_once(&mut ctl.on_async_break_commands),
        PauseSource::Exception => take_run_once(&mut ctl.exception_commands),
    }
}

fn is_run_once(text: &str) -> bool {
    text.contains(RUN_ONCE_MARKER)
}

fn take_run_once(slot: &mut Option<String>) -> Option<String> {
    let text = slot.clone();
    if text.as_deref().is_some_and(is_run_once) {
        *slot = None;
    }
    text
}

/// Parses `text` and queues its statements on the current pause.
///
/// A syntax error queues nothing. An unknown command name stops queueing;
/// statements before it stay queued.
pub fn queue_script<E: DebugEngine>(ctl: &mut Controller<E>, text: &str) {
    let invocations = match parse_script(text) {
        Ok(invocations) => invocations,
        Err(err) => {
            ctl.report(&err);
            return;
        }
    };
    for invocation in invocations {
        if let Err(err) = ctl.queue_command(&invocation.name, invocation.args) {
            ctl.report(&format!("{err} (offset {})", invocation.offset));
            break;
        }
    }
}

/// Pops commands until the queue is empty or the pause resumed, then runs
/// every completion regardless.
fn drain<E: DebugEngine>(ctl: &mut Controller<E>) {
    loop {
        let Some(pause) = ctl.pauses.last_mut() else {
            return;
        };
        if pause.resumed {
            break;
        }
        let Some(command) = pause.queue.pop() else {
            break;
        };
        ctl.trace_line(TraceFlags::COMMANDS, || format!("cmd: {command:?}"));

        let outcome = match &command.handler {
            Handler::Builtin(builtin) => builtin.run(ctl, &command.args).map(|()| None),
            Handler::Host(handler) => (**handler)(ctl, &command.args),
        };
        match outcome {
            Ok(Some(completion)) => push_completion(ctl, completion),
            Ok(None) => {}
            Err(err) => ctl.report(&err),
        }
    }

    while let Some(completion) = ctl
        .pauses
        .last_mut()
        .and_then(|pause| pause.queue.pop_completion())
    {
        if let Err(err) = completion(ctl) {
            ctl.report(&err);
        }
    }
}

fn push_completion<E: DebugEngine>(ctl: &mut Controller<E>, completion: Completion<E>) {
    match ctl.pauses.last_mut() {
        Some(pause) => pause.queue.push_completion(completion),
        None => ctl.report(&CommandError::NotPaused),
    }
}
