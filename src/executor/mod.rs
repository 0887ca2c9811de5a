mod commands;
mod queue;
mod runner;

pub use commands::{Builtin, IGNORED_COMMANDS};
pub use queue::{Command, CommandQueue, Completion, Handler, HostHandler};
pub(crate) use runner::{handle_pause, queue_script};
pub use runner::{PauseSource, DEBUGGER_STATEMENT_COMMANDS, RUN_ONCE_MARKER};
