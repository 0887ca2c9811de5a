use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::commands::Builtin;
use crate::debugger::Controller;
use crate::error::CommandError;
use crate::parser::Arg;

/// Deferred work returned by a command, run after the command FIFO stops.
pub type Completion<E> = Box<dyn FnOnce(&mut Controller<E>) -> Result<(), CommandError>>;

/// A command registered by the host in addition to the built-ins.
pub type HostHandler<E> =
    Rc<dyn Fn(&mut Controller<E>, &[Arg]) -> Result<Option<Completion<E>>, CommandError>>;

pub enum Handler<E> {
    Builtin(Builtin),
    Host(HostHandler<E>),
}

impl<E> Clone for Handler<E> {
    fn clone(&self) -> Self {
        match self {
            Handler::Builtin(builtin) => Handler::Builtin(*builtin),
            Handler::Host(handler) => Handler::Host(Rc::clone(handler)),
        }
    }
}

pub struct Command<E> {
    pub name: String,
    pub handler: Handler<E>,
    pub args: Vec<Arg>,
}

impl<E> fmt::Debug for Command<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.handler {
            Handler::Builtin(_) => "builtin",
            Handler::Host(_) => "host",
        };
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("handler", &kind)
            .field("args", &self.args)
            .finish()
    }
}

/// Pending commands of one pause, plus the completions they returned.
pub struct CommandQueue<E> {
    commands: VecDeque<Command<E>>,
    completions: VecDeque<Completion<E>>,
}

impl<E> Default for CommandQueue<E> {
    fn default() -> Self {
        Self {
            commands: VecDeque::new(),
            completions: VecDeque::new(),
        }
    }
}

impl<E> CommandQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command<E>) {
        self.commands.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command<E>> {
        self.commands.pop_front()
    }

    pub fn push_completion(&mut self, completion: Completion<E>) {
        self.completions.push_back(completion);
    }

    pub fn pop_completion(&mut self) -> Option<Completion<E>> {
        self.completions.pop_front()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<E> fmt::Debug for CommandQueue<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandQueue")
            .field("commands", &self.commands)
            .field("completions", &self.completions.len())
            .finish()
    }
}
