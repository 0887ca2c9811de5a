//! The fixed set of operations the controller needs from a native debugging
//! engine.
//!
//! Every call is synchronous and may fail. An engine whose operations can
//! re-enter the controller (an `evaluate` that compiles code and raises a
//! `SourceCompile` event, for instance) reports those events through
//! [`DebugEngine::take_nested_events`]; the controller dispatches them after
//! every engine call it makes, as soon as that call returns.

mod scripted;
mod types;

pub use scripted::{
    EngineCall, Evaluation, HandleFixture, PauseState, ScriptFixture, ScriptedEngine,
};
pub use types::{
    BreakpointInfo, DebugEvent, EngineBreakpoint, ExceptionMode, FunctionPosition, Handle,
    PropertyPage, PropertyValue, ScriptId, ScriptInfo, SourceText, StackFrame, StackProperties,
    StepType,
};

use crate::error::EngineError;

pub trait DebugEngine {
    fn set_breakpoint(
        &mut self,
        script_id: ScriptId,
        line: u32,
        column: u32,
    ) -> Result<EngineBreakpoint, EngineError>;

    fn remove_breakpoint(&mut self, breakpoint_id: u32) -> Result<(), EngineError>;

    fn set_break_on_exception(&mut self, attributes: u32) -> Result<(), EngineError>;

    fn set_step_type(&mut self, step: StepType) -> Result<(), EngineError>;

    fn get_stack_properties(&mut self, frame_index: u32) -> Result<StackProperties, EngineError>;

    fn get_stack_trace(&mut self) -> Result<Vec<StackFrame>, EngineError>;

    fn get_object_from_handle(&mut self, handle: Handle) -> Result<PropertyValue, EngineError>;

    fn evaluate(&mut self, frame_index: u32, expression: &str)
        -> Result<PropertyValue, EngineError>;

    fn get_properties(
        &mut self,
        handle: Handle,
        start: u32,
        count: u32,
    ) -> Result<PropertyPage, EngineError>;

    fn get_breakpoints(&mut self) -> Result<Vec<BreakpointInfo>, EngineError>;

    fn get_scripts(&mut self) -> Result<Vec<ScriptInfo>, EngineError>;

    fn get_source(&mut self, script_id: ScriptId) -> Result<SourceText, EngineError>;

    /// Events raised while the previous call was running.
    fn take_nested_events(&mut self) -> Vec<DebugEvent> {
        Vec::new()
    }
}
