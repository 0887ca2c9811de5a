use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::breakpoints::{BreakpointRequest, BreakpointTable};
use super::context::PauseContext;
use crate::config::{ControllerConfig, TraceFlags};
use crate::engine::{DebugEngine, DebugEvent, FunctionPosition, ScriptId, ScriptInfo};
use crate::error::{CommandError, ControllerError, ParseError};
use crate::executor::{self, Builtin, Command, Completion, Handler, HostHandler, PauseSource};
use crate::output::{file_basename, Baseline, EventLog, Mismatch, ObjectSummarizer, Verdict};
use crate::parser::{self, Arg, Directive, DirectiveKind};

/// `tracing` target of the lines gated by [`TraceFlags`].
pub const TRACE_TARGET: &str = "script_debugger::trace";

/// Sits between a debugging engine and annotated test scripts.
///
/// Source compiles are scanned for breakpoint annotations; pauses run the
/// annotation's command text and record structured output in the event
/// log, which is finally compared against a baseline.
pub struct Controller<E> {
    pub(crate) engine: E,
    pub(crate) breakpoints: BreakpointTable,
    pub(crate) exception_commands: Option<String>,
    pub(crate) on_async_break_commands: Option<String>,
    exception_declared: bool,
    on_async_break_declared: bool,
    pub(crate) pauses: Vec<PauseContext<E>>,
    event_log: EventLog,
    baseline: Option<Baseline>,
    pub(crate) summarizer: ObjectSummarizer,
    trace: TraceFlags,
    diagnostics: Vec<String>,
    host_commands: BTreeMap<String, HostHandler<E>>,
}

impl<E: DebugEngine> Controller<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, &ControllerConfig::default())
    }

    pub fn with_config(engine: E, config: &ControllerConfig) -> Self {
        Self {
            engine,
            breakpoints: BreakpointTable::new(),
            exception_commands: None,
            on_async_break_commands: None,
            exception_declared: false,
            on_async_break_declared: false,
            pauses: Vec::new(),
            event_log: EventLog::new(),
            baseline: None,
            summarizer: ObjectSummarizer::new(
                config.inspect_max_string_length,
                config.property_page_size,
            ),
            trace: config.trace_flags(),
            diagnostics: Vec::new(),
            host_commands: BTreeMap::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn breakpoints(&self) -> &BreakpointTable {
        &self.breakpoints
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Every reported error, as `Error: ...` lines, in report order.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn trace_flags(&self) -> TraceFlags {
        self.trace
    }

    pub fn enable_trace(&mut self, flags: TraceFlags) {
        self.trace |= flags;
    }

    pub fn exception_commands(&self) -> Option<&str> {
        self.exception_commands.as_deref()
    }

    pub fn on_async_break_commands(&self) -> Option<&str> {
        self.on_async_break_commands.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        !self.pauses.is_empty()
    }

    /// Number of pauses currently being handled, nested ones included.
    pub fn pause_depth(&self) -> usize {
        self.pauses.len()
    }

    pub fn current_pause(&self) -> Option<&PauseContext<E>> {
        self.pauses.last()
    }

    pub fn current_pause_mut(&mut self) -> Option<&mut PauseContext<E>> {
        self.pauses.last_mut()
    }

    /// Frame that `locals` and `evaluate` look at.
    pub fn frame_index(&self) -> u32 {
        self.pauses.last().map_or(0, |pause| pause.frame_index)
    }

    // ---- events ----

    pub fn handle_debug_event(&mut self, event: DebugEvent) {
        self.trace_line(TraceFlags::DEBUG_EVENTS, || {
            format!("debugEvent: {} {event:?}", event.name())
        });
        match event {
            DebugEvent::SourceCompile { script_id } => self.compile_source(script_id),
            DebugEvent::CompileError => match self.engine_call(|engine| engine.get_scripts()) {
                Ok(scripts) => self.trace_result("getScripts", &scripts),
                Err(err) => self.report(&err),
            },
            DebugEvent::Breakpoint { breakpoint_id }
            | DebugEvent::StepComplete { breakpoint_id } => {
                executor::handle_pause(self, PauseSource::Breakpoint(breakpoint_id));
            }
            DebugEvent::DebuggerStatement => {
                executor::handle_pause(self, PauseSource::DebuggerStatement);
            }
            DebugEvent::AsyncBreak => executor::handle_pause(self, PauseSource::AsyncBreak),
            DebugEvent::RuntimeException => executor::handle_pause(self, PauseSource::Exception),
        }
    }

    /// Entry point for hosts that pass the engine's numeric event codes.
    /// An unknown code is fatal and nothing is dispatched.
    pub fn handle_raw_debug_event(
        &mut self,
        kind: u32,
        data: &Value,
    ) -> Result<(), ControllerError> {
        let event = DebugEvent::from_raw(kind, data)?;
        self.handle_debug_event(event);
        Ok(())
    }

    /// Re-parses every given script after an attach. The breakpoint table
    /// and the exception and async-break slots start over.
    pub fn handle_source_rundown(&mut self, sources: &[ScriptInfo]) {
        self.breakpoints.clear_all();
        self.exception_commands = None;
        self.on_async_break_commands = None;
        self.exception_declared = false;
        self.on_async_break_declared = false;
        if let Some(pause) = self.pauses.last_mut() {
            pause.frame_index = 0;
        }
        for source in sources {
            self.compile_source(source.script_id);
        }
    }

    pub(crate) fn dispatch_nested_events(&mut self) {
        for event in self.engine.take_nested_events() {
            self.handle_debug_event(event);
        }
    }

    /// Runs one engine call, then dispatches whatever it raised.
    pub(crate) fn engine_call<T>(&mut self, call: impl FnOnce(&mut E) -> T) -> T {
        let result = call(&mut self.engine);
        self.dispatch_nested_events();
        result
    }

    /// Like [`Controller::engine_call`] for operations on the breakpoint table.
    pub(crate) fn breakpoint_call<T>(
        &mut self,
        call: impl FnOnce(&mut BreakpointTable, &mut E) -> T,
    ) -> T {
        let result = call(&mut self.breakpoints, &mut self.engine);
        self.dispatch_nested_events();
        result
    }

    fn compile_source(&mut self, script_id: ScriptId) {
        match self.engine_call(|engine| engine.get_source(script_id)) {
            Ok(source) => {
                self.trace_result("getSource", &source);
                self.add_source(source.script_id, &source.source);
            }
            Err(err) => self.report(&err),
        }
    }

    /// Scans one source unit and applies its directives in order. The first
    /// parse error is reported and ends the unit.
    pub fn add_source(&mut self, script_id: ScriptId, text: &str) {
        let scan = parser::scan(text);
        for directive in scan.directives {
            if let Err(err) = self.apply_directive(script_id, directive) {
                self.report(&err);
                return;
            }
        }
        if let Some(err) = scan.error {
            self.report(&err);
        }
    }

    fn apply_directive(
        &mut self,
        script_id: ScriptId,
        directive: Directive,
    ) -> Result<(), ParseError> {
        self.trace_line(TraceFlags::INTERNAL_FUNCTIONS, || format!("directive: {directive:?}"));
        let request = BreakpointRequest {
            name: directive.name,
            script_id,
            line: directive.line,
            column: directive.column_offset.unwrap_or(0),
            command_text: directive.command_text,
        };

        match directive.kind {
            DirectiveKind::Breakpoint => {
                if let Err(err) = self.breakpoint_call(|table, engine| table.set(engine, request)) {
                    self.report(&err);
                }
            }
            DirectiveKind::Location => {
                self.breakpoints.set_location(request);
            }
            DirectiveKind::Exception(mode) => {
                if self.exception_declared {
                    return Err(ParseError::DuplicateException {
                        line: directive.line,
                    });
                }
                self.exception_declared = true;
                let attributes = mode.attributes();
                let set = self.engine_call(|engine| engine.set_break_on_exception(attributes));
                if let Err(err) = set {
                    self.report(&err);
                }
                self.exception_commands = request.command_text;
            }
            DirectiveKind::OnAsyncBreak => {
                if self.on_async_break_declared {
                    return Err(ParseError::DuplicateOnAsyncBreak {
                        line: directive.line,
                    });
                }
                self.on_async_break_declared = true;
                self.on_async_break_commands = request.command_text;
            }
        }
        Ok(())
    }

    // ---- commands ----

    /// Adds a command callable from command text. Built-in names win over
    /// host commands with the same name.
    pub fn register_command<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut Controller<E>, &[Arg]) -> Result<Option<Completion<E>>, CommandError> + 'static,
    {
        self.host_commands.insert(name.to_string(), Rc::new(handler));
    }

    /// Queues a command on the current pause. It runs from the drain loop,
    /// never immediately.
    pub fn queue_command(&mut self, name: &str, args: Vec<Arg>) -> Result<(), CommandError> {
        if executor::IGNORED_COMMANDS.contains(&name) {
            return Ok(());
        }
        let handler = match Builtin::lookup(name) {
            Some(builtin) => Handler::Builtin(builtin),
            None => self
                .host_commands
                .get(name)
                .map(|handler| Handler::Host(Rc::clone(handler)))
                .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?,
        };
        let pause = self.pauses.last_mut().ok_or(CommandError::NotPaused)?;
        pause.queue.push(Command {
            name: name.to_string(),
            handler,
            args,
        });
        Ok(())
    }

    /// Parses command text and queues its statements on the current pause.
    pub fn queue_script(&mut self, text: &str) {
        executor::queue_script(self, text);
    }

    // ---- output ----

    pub fn record(&mut self, entry: Value) {
        self.event_log.record(entry);
    }

    pub fn get_output_json(&self) -> String {
        self.event_log.to_json()
    }

    /// Stores the expected log. Invalid JSON is reported and keeps the
    /// previous baseline.
    pub fn set_baseline(&mut self, text: &str) -> Result<(), ControllerError> {
        match Baseline::parse(text) {
            Ok(baseline) => {
                self.baseline = Some(baseline);
                Ok(())
            }
            Err(err) => {
                self.report(&err);
                tracing::info!("{text}");
                Err(err)
            }
        }
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn mismatches(&self) -> Vec<Mismatch> {
        match &self.baseline {
            Some(baseline) => baseline.compare(&Value::Array(self.event_log.entries().to_vec())),
            None => Vec::new(),
        }
    }

    /// Passes without a baseline. Every difference is reported.
    pub fn verify(&mut self) -> Verdict {
        let mismatches = self.mismatches();
        if mismatches.is_empty() {
            return Verdict::Pass;
        }
        for mismatch in &mismatches {
            self.report(mismatch);
        }
        Verdict::Fail
    }

    pub fn set_inspect_max_string_length(&mut self, length: usize) {
        self.summarizer.set_max_string_length(length);
    }

    pub fn dump_function_position(&mut self, position: Option<FunctionPosition>) {
        let Some(mut position) = position else {
            self.record(json!({ "functionPosition": Map::new() }));
            return;
        };
        position.file_name = file_basename(&position.file_name).to_string();
        match serde_json::to_value(&position) {
            Ok(value) => self.record(json!({ "functionPosition": value })),
            Err(err) => self.report(&err),
        }
    }

    // ---- diagnostics ----

    pub(crate) fn report(&mut self, err: &dyn fmt::Display) {
        tracing::error!("{err}");
        self.diagnostics.push(format!("Error: {err}"));
    }

    pub(crate) fn trace_line(&self, flag: TraceFlags, line: impl FnOnce() -> String) {
        if self.trace.contains(flag) {
            tracing::info!(target: TRACE_TARGET, "{}", line());
        }
    }

    /// `{operation: result}` for engine calls, under `TRACE_DIAG_OUTPUT`.
    pub(crate) fn trace_result<T: Serialize + ?Sized>(&self, operation: &str, result: &T) {
        self.trace_line(TraceFlags::DIAG_OUTPUT, || {
            let result = serde_json::to_value(result).unwrap_or(Value::Null);
            let mut entry = Map::new();
            entry.insert(operation.to_string(), result);
            Value::Object(entry).to_string()
        });
    }
}

impl<E> fmt::Debug for Controller<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("breakpoints", &self.breakpoints)
            .field("exception_commands", &self.exception_commands)
            .field("on_async_break_commands", &self.on_async_break_commands)
            .field("pause_depth", &self.pauses.len())
            .field("event_log", &self.event_log.len())
            .field("trace", &self.trace)
            .finish()
    }
}
