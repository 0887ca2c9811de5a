use std::path::PathBuf;

use thiserror::Error;

use crate::debugger::BreakpointId;

/// Problems found while scanning a source unit for annotations.
///
/// Any of these aborts the rest of the unit; directives found before the
/// error have already been applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unterminated breakpoint expression (line {line})")]
    Unterminated { line: u32 },
    #[error("'loc' sites require a label, for example /**loc(myFunc)**/ (line {line})")]
    MissingLocationName { line: u32 },
    #[error("Invalid breakpoint parameter '{text}' (line {line})")]
    InvalidParameter { line: u32, text: String },
    #[error("Invalid breakpoint string: {text} (line {line})")]
    InvalidDirective { line: u32, text: String },
    #[error("Invalid exception type '{text}', expected none, uncaught or all (line {line})")]
    InvalidExceptionMode { line: u32, text: String },
    #[error("More than one 'exception' annotation found (line {line})")]
    DuplicateException { line: u32 },
    #[error("More than one 'onasyncbreak' annotation found (line {line})")]
    DuplicateOnAsyncBreak { line: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{operation} failed: {message}")]
    Failed {
        operation: &'static str,
        message: String,
    },
    #[error("unknown object handle {0}")]
    UnknownHandle(u32),
    #[error("unknown script {0}")]
    UnknownScript(u32),
    #[error("unknown breakpoint {0}")]
    UnknownBreakpoint(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakpointError {
    #[error("Breakpoint named '{0}' was not found")]
    NotFound(String),
    #[error("Breakpoint '{0}' was not found")]
    UnknownId(BreakpointId),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Failures of a single queued command. Reported; the drain loop keeps going.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Breakpoint resumed twice")]
    ResumedTwice,
    #[error("Unhandled step type - {0}")]
    UnknownStepKind(String),
    #[error("'{0}' is not a debugger command")]
    UnknownCommand(String),
    #[error("{command}: {message}")]
    InvalidArgument {
        command: &'static str,
        message: String,
    },
    #[error("syntax error in command text at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error("no pause is active")]
    NotPaused,
    #[error("logJson: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Breakpoint(#[from] BreakpointError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Unhandled JsDiagDebugEvent value {0}")]
    UnknownEventKind(u32),
    #[error("malformed {kind} event data: missing '{field}'")]
    MalformedEvent {
        kind: &'static str,
        field: &'static str,
    },
    #[error("Invalid JSON passed to setBaseline: {0}")]
    InvalidBaseline(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario: {0}")]
    Scenario(#[from] serde_json::Error),
}
