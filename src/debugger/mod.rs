mod breakpoints;
mod context;
mod controller;
mod stepping;

pub use breakpoints::{BreakpointId, BreakpointRecord, BreakpointRequest, BreakpointTable};
pub use context::PauseContext;
pub use controller::{Controller, TRACE_TARGET};
pub use stepping::ResumeKind;
