use std::str::FromStr;

use crate::engine::StepType;
use crate::error::CommandError;

/// Argument of the `resume(kind)` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeKind {
    StepInto,
    StepDocument,
    StepOut,
    StepOver,
    Continue,
}

impl ResumeKind {
    /// Step behavior to request before resuming; `None` just continues.
    pub fn step_type(self) -> Option<StepType> {
        match self {
            ResumeKind::StepInto | ResumeKind::StepDocument => Some(StepType::StepIn),
            ResumeKind::StepOut => Some(StepType::StepOut),
            ResumeKind::StepOver => Some(StepType::StepOver),
            ResumeKind::Continue => None,
        }
    }
}

impl FromStr for ResumeKind {
    type Err = CommandError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "step_into" => Ok(ResumeKind::StepInto),
            "step_document" => Ok(ResumeKind::StepDocument),
            "step_out" => Ok(ResumeKind::StepOut),
            "step_over" => Ok(ResumeKind::StepOver),
            "continue" => Ok(ResumeKind::Continue),
            other => Err(CommandError::UnknownStepKind(other.to_string())),
        }
    }
}
