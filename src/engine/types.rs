use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ControllerError;

pub type ScriptId = u32;
pub type Handle = u32;

/// What the engine hands back after materializing a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineBreakpoint {
    pub breakpoint_id: u32,
    pub line: u32,
    pub column: u32,
}

/// Entry of the engine's own breakpoint list (`dumpBreak`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointInfo {
    pub breakpoint_id: u32,
    pub script_id: ScriptId,
    pub line: u32,
    pub column: u32,
}

/// A variable, property or evaluation result as described by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValue {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_attributes: Option<u32>,
    /// Present when the value has expandable children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<Handle>,
}

/// One page of child properties for a handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPage {
    #[serde(default)]
    pub properties: Vec<PropertyValue>,
    #[serde(default)]
    pub debugger_only_properties: Vec<PropertyValue>,
}

/// Everything visible from one stack frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub this_object: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_calls_return: Vec<PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locals: Vec<PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub globals: Option<PropertyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub index: u32,
    pub line: u32,
    pub column: u32,
    #[serde(default)]
    pub source_text: String,
    pub function_handle: Handle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<ScriptId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptInfo {
    pub script_id: ScriptId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_length: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceText {
    pub script_id: ScriptId,
    pub source: String,
}

/// Location of a function, as reported by the host for `DumpFunctionPosition`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionPosition {
    pub script_id: ScriptId,
    #[serde(default)]
    pub file_name: String,
    pub line: u32,
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_statement_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_statement_column: Option<u32>,
}

/// Break-on-exception attribute mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionMode {
    None,
    Uncaught,
    All,
}

impl ExceptionMode {
    pub fn attributes(self) -> u32 {
        match self {
            ExceptionMode::None => 0,
            ExceptionMode::Uncaught => 0b10,
            ExceptionMode::All => 0b11,
        }
    }

    pub fn from_name(name: &str) -> Option<ExceptionMode> {
        match name {
            "none" => Some(ExceptionMode::None),
            "uncaught" => Some(ExceptionMode::Uncaught),
            "all" => Some(ExceptionMode::All),
            _ => None,
        }
    }
}

/// Step behavior requested from the engine on resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepType {
    StepIn,
    StepOut,
    StepOver,
}

impl StepType {
    pub fn code(self) -> u32 {
        match self {
            StepType::StepIn => 0,
            StepType::StepOut => 1,
            StepType::StepOver => 2,
        }
    }
}

/// Events raised by the engine. Each one is dispatched exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DebugEvent {
    SourceCompile {
        #[serde(rename = "scriptId")]
        script_id: ScriptId,
    },
    CompileError,
    Breakpoint {
        #[serde(rename = "breakpointId", default)]
        breakpoint_id: Option<u32>,
    },
    StepComplete {
        #[serde(rename = "breakpointId", default)]
        breakpoint_id: Option<u32>,
    },
    DebuggerStatement,
    AsyncBreak,
    RuntimeException,
}

impl DebugEvent {
    /// Maps the engine's numeric event codes and their JSON payloads.
    pub fn from_raw(kind: u32, data: &Value) -> Result<DebugEvent, ControllerError> {
        let breakpoint_id = || {
            data.get("breakpointId")
                .and_then(Value::as_u64)
                .and_then(|id| u32::try_from(id).ok())
        };
        match kind {
            0 => {
                let script_id = data
                    .get("scriptId")
                    .and_then(Value::as_u64)
                    .and_then(|id| u32::try_from(id).ok())
                    .ok_or(ControllerError::MalformedEvent {
                        kind: "SourceCompile",
                        field: "scriptId",
                    })?;
                Ok(DebugEvent::SourceCompile { script_id })
            }
            1 => Ok(DebugEvent::CompileError),
            2 => Ok(DebugEvent::Breakpoint {
                breakpoint_id: breakpoint_id(),
            }),
            3 => Ok(DebugEvent::StepComplete {
                breakpoint_id: breakpoint_id(),
            }),
            4 => Ok(DebugEvent::DebuggerStatement),
            5 => Ok(DebugEvent::AsyncBreak),
            6 => Ok(DebugEvent::RuntimeException),
            other => Err(ControllerError::UnknownEventKind(other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DebugEvent::SourceCompile { .. } => "JsDiagDebugEventSourceCompile",
            DebugEvent::CompileError => "JsDiagDebugEventCompileError",
            DebugEvent::Breakpoint { .. } => "JsDiagDebugEventBreakpoint",
            DebugEvent::StepComplete { .. } => "JsDiagDebugEventStepComplete",
            DebugEvent::DebuggerStatement => "JsDiagDebugEventDebuggerStatement",
            DebugEvent::AsyncBreak => "JsDiagDebugEventAsyncBreak",
            DebugEvent::RuntimeException => "JsDiagDebugEventRuntimeException",
        }
    }
}
