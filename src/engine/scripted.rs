use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::types::{
    BreakpointInfo, DebugEvent, EngineBreakpoint, Handle, PropertyPage, PropertyValue, ScriptId,
    ScriptInfo, SourceText, StackFrame, StackProperties, StepType,
};
use super::DebugEngine;
use crate::error::EngineError;

/// A script known to the scripted engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptFixture {
    pub script_id: ScriptId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub source: String,
    /// Not compiled at startup; only reachable through a nested event.
    #[serde(default)]
    pub deferred: bool,
}

impl ScriptFixture {
    pub fn info(&self) -> ScriptInfo {
        ScriptInfo {
            script_id: self.script_id,
            file_name: self.file_name.clone(),
            line_count: u32::try_from(self.source.split('\n').count()).ok(),
            source_length: u32::try_from(self.source.len()).ok(),
        }
    }
}

/// An expandable object and its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleFixture {
    #[serde(default)]
    pub object: PropertyValue,
    #[serde(default)]
    pub properties: Vec<PropertyValue>,
    #[serde(default)]
    pub debugger_only_properties: Vec<PropertyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub result: PropertyValue,
    /// Events the engine raises while evaluating (dynamic compiles, nested breaks).
    #[serde(default)]
    pub triggers: Vec<DebugEvent>,
}

/// What the debuggee looks like while suspended at one pause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseState {
    #[serde(default)]
    pub stack_trace: Vec<StackFrame>,
    /// Properties of frame 0.
    #[serde(default)]
    pub stack_properties: StackProperties,
    /// Properties of deeper frames, by frame index.
    #[serde(default)]
    pub frame_properties: BTreeMap<u32, StackProperties>,
    #[serde(default)]
    pub evaluations: BTreeMap<String, Evaluation>,
}

/// One call made against the engine, in call order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum EngineCall {
    SetBreakpoint {
        script_id: ScriptId,
        line: u32,
        column: u32,
    },
    RemoveBreakpoint {
        breakpoint_id: u32,
    },
    SetBreakOnException {
        attributes: u32,
    },
    SetStepType {
        step: StepType,
    },
    GetStackProperties {
        frame_index: u32,
    },
    GetStackTrace,
    GetObjectFromHandle {
        handle: Handle,
    },
    Evaluate {
        frame_index: u32,
        expression: String,
    },
    GetProperties {
        handle: Handle,
        start: u32,
        count: u32,
    },
    GetBreakpoints,
    GetScripts,
    GetSource {
        script_id: ScriptId,
    },
}

impl EngineCall {
    fn operation(&self) -> &'static str {
        match self {
            EngineCall::SetBreakpoint { .. } => "setBreakpoint",
            EngineCall::RemoveBreakpoint { .. } => "removeBreakpoint",
            EngineCall::SetBreakOnException { .. } => "setBreakOnException",
            EngineCall::SetStepType { .. } => "setStepType",
            EngineCall::GetStackProperties { .. } => "getStackProperties",
            EngineCall::GetStackTrace => "getStackTrace",
            EngineCall::GetObjectFromHandle { .. } => "getObjectFromHandle",
            EngineCall::Evaluate { .. } => "evaluate",
            EngineCall::GetProperties { .. } => "getProperties",
            EngineCall::GetBreakpoints => "getBreakpoints",
            EngineCall::GetScripts => "getScripts",
            EngineCall::GetSource { .. } => "getSource",
        }
    }
}

/// A data-driven engine: scripts, objects and pause state come from fixtures.
///
/// Breakpoint ids are handed out from 1 upward. Every call is recorded so
/// tests can assert on the exact engine traffic.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    scripts: Vec<ScriptFixture>,
    handles: BTreeMap<Handle, HandleFixture>,
    pause: PauseState,
    breakpoints: BTreeMap<u32, BreakpointInfo>,
    next_breakpoint_id: u32,
    break_on_exception: Option<u32>,
    step_type: Option<StepType>,
    failing: BTreeSet<&'static str>,
    raised: BTreeMap<&'static str, Vec<DebugEvent>>,
    nested: Vec<DebugEvent>,
    calls: Vec<EngineCall>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            scripts: Vec::new(),
            handles: BTreeMap::new(),
            pause: PauseState::default(),
            breakpoints: BTreeMap::new(),
            next_breakpoint_id: 1,
            break_on_exception: None,
            step_type: None,
            failing: BTreeSet::new(),
            raised: BTreeMap::new(),
            nested: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn with_script(mut self, script_id: ScriptId, file_name: &str, source: &str) -> Self {
        self.add_script(ScriptFixture {
            script_id,
            file_name: Some(file_name.to_string()),
            source: source.to_string(),
            deferred: false,
        });
        self
    }

    pub fn add_script(&mut self, script: ScriptFixture) {
        self.scripts.retain(|s| s.script_id != script.script_id);
        self.scripts.push(script);
    }

    pub fn add_handle(&mut self, handle: Handle, fixture: HandleFixture) {
        self.handles.insert(handle, fixture);
    }

    pub fn scripts(&self) -> &[ScriptFixture] {
        &self.scripts
    }

    /// Replaces the pause state seen by stack and evaluation calls.
    pub fn load_pause(&mut self, pause: PauseState) {
        self.pause = pause;
    }

    /// Makes every later call of `operation` (e.g. `"getProperties"`) fail.
    pub fn fail_operation(&mut self, operation: &'static str) {
        self.failing.insert(operation);
    }

    /// The next call of `operation` raises `event` before returning.
    pub fn raise_during(&mut self, operation: &'static str, event: DebugEvent) {
        self.raised.entry(operation).or_default().push(event);
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count_calls(&self, operation: &str) -> usize {
        self.calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    pub fn live_breakpoints(&self) -> Vec<BreakpointInfo> {
        self.breakpoints.values().cloned().collect()
    }

    pub fn break_on_exception(&self) -> Option<u32> {
        self.break_on_exception
    }

    pub fn step_type(&self) -> Option<StepType> {
        self.step_type
    }

    fn record(&mut self, call: EngineCall) -> Result<(), EngineError> {
        let operation = call.operation();
        self.calls.push(call);
        if let Some(events) = self.raised.remove(operation) {
            self.nested.extend(events);
        }
        if self.failing.contains(operation) {
            return Err(EngineError::Failed {
                operation,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn script(&self, script_id: ScriptId) -> Result<&ScriptFixture, EngineError> {
        self.scripts
            .iter()
            .find(|s| s.script_id == script_id)
            .ok_or(EngineError::UnknownScript(script_id))
    }
}

impl DebugEngine for ScriptedEngine {
    fn set_breakpoint(
        &mut self,
        script_id: ScriptId,
        line: u32,
        column: u32,
    ) -> Result<EngineBreakpoint, EngineError> {
        self.record(EngineCall::SetBreakpoint {
            script_id,
            line,
            column,
        })?;
        self.script(script_id)?;

        let breakpoint_id = self.next_breakpoint_id;
        self.next_breakpoint_id += 1;
        self.breakpoints.insert(
            breakpoint_id,
            BreakpointInfo {
                breakpoint_id,
                script_id,
                line,
                column,
            },
        );
        Ok(EngineBreakpoint {
            breakpoint_id,
            line,
            column,
        })
    }

    fn remove_breakpoint(&mut self, breakpoint_id: u32) -> Result<(), EngineError> {
        self.record(EngineCall::RemoveBreakpoint { breakpoint_id })?;
        self.breakpoints
            .remove(&breakpoint_id)
            .map(|_| ())
            .ok_or(EngineError::UnknownBreakpoint(breakpoint_id))
    }

    fn set_break_on_exception(&mut self, attributes: u32) -> Result<(), EngineError> {
        self.record(EngineCall::SetBreakOnException { attributes })?;
        self.break_on_exception = Some(attributes);
        Ok(())
    }

    fn set_step_type(&mut self, step: StepType) -> Result<(), EngineError> {
        self.record(EngineCall::SetStepType { step })?;
        self.step_type = Some(step);
        Ok(())
    }

    fn get_stack_properties(&mut self, frame_index: u32) -> Result<StackProperties, EngineError> {
        self.record(EngineCall::GetStackProperties { frame_index })?;
        if frame_index == 0 {
            return Ok(self.pause.stack_properties.clone());
        }
        self.pause
            .frame_properties
            .get(&frame_index)
            .cloned()
            .ok_or_else(|| EngineError::Failed {
                operation: "getStackProperties",
                message: format!("no frame {frame_index}"),
            })
    }

    fn get_stack_trace(&mut self) -> Result<Vec<StackFrame>, EngineError> {
        self.record(EngineCall::GetStackTrace)?;
        Ok(self.pause.stack_trace.clone())
    }

    fn get_object_from_handle(&mut self, handle: Handle) -> Result<PropertyValue, EngineError> {
        self.record(EngineCall::GetObjectFromHandle { handle })?;
        self.handles
            .get(&handle)
            .map(|fixture| fixture.object.clone())
            .ok_or(EngineError::UnknownHandle(handle))
    }

    fn evaluate(
        &mut self,
        frame_index: u32,
        expression: &str,
    ) -> Result<PropertyValue, EngineError> {
        self.record(EngineCall::Evaluate {
            frame_index,
            expression: expression.to_string(),
        })?;
        let evaluation = self
            .pause
            .evaluations
            .get(expression)
            .cloned()
            .ok_or_else(|| EngineError::Failed {
                operation: "evaluate",
                message: format!("'{expression}' is not defined"),
            })?;
        self.nested.extend(evaluation.triggers);
        Ok(evaluation.result)
    }

    fn get_properties(
        &mut self,
        handle: Handle,
        start: u32,
        count: u32,
    ) -> Result<PropertyPage, EngineError> {
        self.record(EngineCall::GetProperties {
            handle,
            start,
            count,
        })?;
        let fixture = self
            .handles
            .get(&handle)
            .ok_or(EngineError::UnknownHandle(handle))?;
        let page = |props: &[PropertyValue]| -> Vec<PropertyValue> {
            props
                .iter()
                .skip(start as usize)
                .take(count as usize)
                .cloned()
                .collect()
        };
        Ok(PropertyPage {
            properties: page(&fixture.properties),
            debugger_only_properties: page(&fixture.debugger_only_properties),
        })
    }

    fn get_breakpoints(&mut self) -> Result<Vec<BreakpointInfo>, EngineError> {
        self.record(EngineCall::GetBreakpoints)?;
        Ok(self.live_breakpoints())
    }

    fn get_scripts(&mut self) -> Result<Vec<ScriptInfo>, EngineError> {
        self.record(EngineCall::GetScripts)?;
        Ok(self.scripts.iter().map(ScriptFixture::info).collect())
    }

    fn get_source(&mut self, script_id: ScriptId) -> Result<SourceText, EngineError> {
        self.record(EngineCall::GetSource { script_id })?;
        let script = self.script(script_id)?;
        Ok(SourceText {
            script_id,
            source: script.source.clone(),
        })
    }

    fn take_nested_events(&mut self) -> Vec<DebugEvent> {
        std::mem::take(&mut self.nested)
    }
}
