use serde_json::{json, Map, Value};

use crate::config::TraceFlags;
use crate::debugger::{Controller, ResumeKind};
use crate::engine::{DebugEngine, PropertyValue};
use crate::error::CommandError;
use crate::output::file_basename;
use crate::parser::Arg;

/// Names that parse as commands but do nothing. `removeExpr()` is the
/// run-once marker; the rest are kept so older test files still run.
pub const IGNORED_COMMANDS: [&str; 7] = [
    "removeExpr",
    "setExceptionResume",
    "setnext",
    "evaluateAsync",
    "trackProjectionCall",
    "mbp",
    "deleteMbp",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Log,
    LogJson,
    Resume,
    Locals,
    Stack,
    Evaluate,
    EnableBp,
    DisableBp,
    DeleteBp,
    SetFrame,
    DumpBreak,
    DumpSourceList,
    Trace,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        let builtin = match name {
            "log" => Builtin::Log,
            "logJson" => Builtin::LogJson,
            "resume" => Builtin::Resume,
            "locals" => Builtin::Locals,
            "stack" => Builtin::Stack,
            "evaluate" => Builtin::Evaluate,
            "enableBp" => Builtin::EnableBp,
            "disableBp" => Builtin::DisableBp,
            "deleteBp" => Builtin::DeleteBp,
            "setFrame" => Builtin::SetFrame,
            "dumpBreak" => Builtin::DumpBreak,
            "dumpSourceList" => Builtin::DumpSourceList,
            "trace" => Builtin::Trace,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Log => "log",
            Builtin::LogJson => "logJson",
            Builtin::Resume => "resume",
            Builtin::Locals => "locals",
            Builtin::Stack => "stack",
            Builtin::Evaluate => "evaluate",
            Builtin::EnableBp => "enableBp",
            Builtin::DisableBp => "disableBp",
            Builtin::DeleteBp => "deleteBp",
            Builtin::SetFrame => "setFrame",
            Builtin::DumpBreak => "dumpBreak",
            Builtin::DumpSourceList => "dumpSourceList",
            Builtin::Trace => "trace",
        }
    }

    pub fn run<E: DebugEngine>(
        self,
        ctl: &mut Controller<E>,
        args: &[Arg],
    ) -> Result<(), CommandError> {
        match self {
            Builtin::Log => log(ctl, args),
            Builtin::LogJson => log_json(ctl, args),
            Builtin::Resume => resume(ctl, args),
            Builtin::Locals => locals(ctl, args),
            Builtin::Stack => stack(ctl),
            Builtin::Evaluate => evaluate(ctl, args),
            Builtin::EnableBp => {
                let name = string_arg(self, args)?;
                ctl.breakpoint_call(|table, engine| table.enable(engine, name))?;
                Ok(())
            }
            Builtin::DisableBp => {
                let name = string_arg(self, args)?;
                ctl.breakpoint_call(|table, engine| table.disable(engine, name))?;
                Ok(())
            }
            Builtin::DeleteBp => {
                let name = string_arg(self, args)?;
                ctl.breakpoint_call(|table, engine| table.delete(engine, name))?;
                Ok(())
            }
            Builtin::SetFrame => set_frame(ctl, args),
            Builtin::DumpBreak => dump_break(ctl),
            Builtin::DumpSourceList => dump_source_list(ctl),
            Builtin::Trace => trace(ctl, args),
        }
    }
}

fn string_arg(command: Builtin, args: &[Arg]) -> Result<&str, CommandError> {
    match args.first() {
        Some(Arg::Str(text)) => Ok(text),
        Some(other) => Err(CommandError::InvalidArgument {
            command: command.name(),
            message: format!("expected a string, found {other}"),
        }),
        None => Err(CommandError::InvalidArgument {
            command: command.name(),
            message: "missing argument".to_string(),
        }),
    }
}

/// Expand level as given by the test author, never negative.
fn expand_level(arg: Option<&Arg>) -> i64 {
    arg.and_then(Arg::as_integer).unwrap_or(0).max(0)
}

fn summarize<E: DebugEngine>(ctl: &mut Controller<E>, value: &PropertyValue, depth: i64) -> Value {
    let summary = ctl.summarizer.summarize(&mut ctl.engine, value, depth);
    ctl.dispatch_nested_events();
    summary
}

fn log<E: DebugEngine>(ctl: &mut Controller<E>, args: &[Arg]) -> Result<(), CommandError> {
    let text = args
        .first()
        .map_or_else(|| "undefined".to_string(), Arg::to_string);
    tracing::info!("LOG: {text}");
    ctl.record(json!({ "log": text }));
    Ok(())
}

fn log_json<E: DebugEngine>(ctl: &mut Controller<E>, args: &[Arg]) -> Result<(), CommandError> {
    let text = string_arg(Builtin::LogJson, args)?;
    let value: Value = serde_json::from_str(text)?;
    tracing::info!("{text}");
    ctl.record(json!({ "logJson": value }));
    Ok(())
}

fn resume<E: DebugEngine>(ctl: &mut Controller<E>, args: &[Arg]) -> Result<(), CommandError> {
    if ctl.current_pause().ok_or(CommandError::NotPaused)?.resumed {
        return Err(CommandError::ResumedTwice);
    }
    let kind: ResumeKind = match args.first() {
        Some(Arg::Str(kind)) => kind.parse()?,
        Some(other) => return Err(CommandError::UnknownStepKind(other.to_string())),
        None => return Err(CommandError::UnknownStepKind("undefined".to_string())),
    };
    if let Some(step) = kind.step_type() {
        ctl.engine_call(|engine| engine.set_step_type(step))?;
        ctl.trace_result("setStepType", &step.code());
    }
    if let Some(pause) = ctl.current_pause_mut() {
        pause.mark_resumed();
    }
    Ok(())
}

fn locals<E: DebugEngine>(ctl: &mut Controller<E>, args: &[Arg]) -> Result<(), CommandError> {
    let level = expand_level(args.first());
    let depth = level - 1;
    let frame = ctl.frame_index();
    let properties = ctl.engine_call(|engine| engine.get_stack_properties(frame))?;
    ctl.trace_result("getStackProperties", &properties);

    let mut out = Map::new();
    let singles = [
        (&properties.this_object, "this"),
        (&properties.exception, "exception"),
        (&properties.arguments, "arguments"),
        (&properties.return_value, "returnValue"),
    ];
    for (value, key) in singles {
        if let Some(value) = value {
            let key = if value.name.is_empty() {
                key
            } else {
                value.name.as_str()
            };
            let summary = summarize(ctl, value, depth);
            out.insert(key.to_string(), summary);
        }
    }

    for (key, list) in [
        ("functionCallsReturn", &properties.function_calls_return),
        ("locals", &properties.locals),
    ] {
        if list.is_empty() {
            continue;
        }
        let mut entries = Map::new();
        for value in list {
            let summary = summarize(ctl, value, depth);
            entries.insert(value.name.clone(), summary);
        }
        out.insert(key.to_string(), Value::Object(entries));
    }

    for (index, scope) in properties.scopes.iter().enumerate() {
        let summary = summarize(ctl, scope, depth);
        out.insert(format!("scopes{index}"), summary);
    }

    if level > 0 {
        if let Some(globals) = &properties.globals {
            let summary = summarize(ctl, globals, depth);
            out.insert("globals".to_string(), summary);
        }
    }

    ctl.record(Value::Object(out));
    Ok(())
}

fn stack<E: DebugEngine>(ctl: &mut Controller<E>) -> Result<(), CommandError> {
    let frames = ctl.engine_call(|engine| engine.get_stack_trace())?;
    ctl.trace_result("getStackTrace", &frames);

    let mut call_stack = Vec::with_capacity(frames.len());
    for frame in &frames {
        let handle = frame.function_handle;
        // One unresolvable function keeps the rest of the stack.
        let function = match ctl.engine_call(|engine| engine.get_object_from_handle(handle)) {
            Ok(function) => function.name,
            Err(err) => {
                ctl.report(&err);
                String::new()
            }
        };
        call_stack.push(json!({
            "line": frame.line,
            "column": frame.column,
            "sourceText": frame.source_text,
            "function": function,
        }));
    }
    ctl.record(json!({ "callStack": call_stack }));
    Ok(())
}

fn evaluate<E: DebugEngine>(ctl: &mut Controller<E>, args: &[Arg]) -> Result<(), CommandError> {
    let expression = match args.first() {
        None | Some(Arg::Undefined) => return Ok(()),
        Some(arg) => arg.to_string(),
    };
    let depth = expand_level(args.get(1)) - 1;
    let frame = ctl.frame_index();

    // A dynamic compile or a nested break may be raised while evaluating.
    let result = ctl.engine_call(|engine| engine.evaluate(frame, &expression))?;
    ctl.trace_result("evaluate", &result);

    let name = if result.name.is_empty() {
        expression
    } else {
        result.name.clone()
    };
    let summary = summarize(ctl, &result, depth);
    let mut evaluated = Map::new();
    evaluated.insert(name, summary);
    ctl.record(json!({ "evaluate": evaluated }));
    Ok(())
}

fn set_frame<E: DebugEngine>(ctl: &mut Controller<E>, args: &[Arg]) -> Result<(), CommandError> {
    let frames = ctl.engine_call(|engine| engine.get_stack_trace())?;
    ctl.trace_result("getStackTrace", &frames);
    let Some(depth) = args.first().and_then(Arg::as_integer) else {
        return Ok(());
    };
    if let Some(frame) = frames.iter().find(|frame| i64::from(frame.index) == depth) {
        let index = frame.index;
        if let Some(pause) = ctl.current_pause_mut() {
            pause.frame_index = index;
        }
    }
    Ok(())
}

fn dump_break<E: DebugEngine>(ctl: &mut Controller<E>) -> Result<(), CommandError> {
    let breakpoints = ctl.engine_call(|engine| engine.get_breakpoints())?;
    ctl.trace_result("getBreakpoints", &breakpoints);
    ctl.record(json!({ "breakpoints": serde_json::to_value(&breakpoints)? }));
    Ok(())
}

fn dump_source_list<E: DebugEngine>(ctl: &mut Controller<E>) -> Result<(), CommandError> {
    let mut sources = ctl.engine_call(|engine| engine.get_scripts())?;
    ctl.trace_result("getScripts", &sources);
    for source in &mut sources {
        if let Some(file_name) = source.file_name.as_mut() {
            *file_name = file_basename(file_name).to_string();
        }
    }
    ctl.record(json!({ "sources": serde_json::to_value(&sources)? }));
    Ok(())
}

fn trace<E: DebugEngine>(ctl: &mut Controller<E>, args: &[Arg]) -> Result<(), CommandError> {
    let bits = args
        .first()
        .and_then(Arg::as_integer)
        .and_then(|bits| u32::try_from(bits).ok())
        .ok_or_else(|| CommandError::InvalidArgument {
            command: "trace",
            message: "expected a TRACE_* flag".to_string(),
        })?;
    ctl.enable_trace(TraceFlags::from_bits_truncate(bits));
    Ok(())
}
