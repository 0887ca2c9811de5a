//! Scenario files: a recorded debuggee, replayed against a [`Controller`].
//!
//! ```json
//! {
//!   "config": { "inspectMaxStringLength": 16 },
//!   "scripts": [{ "scriptId": 1, "fileName": "c:\\tests\\a.js", "source": "..." }],
//!   "handles": { "7": { "object": { "name": "f" }, "properties": [] } },
//!   "steps": [
//!     { "event": { "kind": "breakpoint", "breakpointId": 1 },
//!       "pause": { "stackTrace": [], "stackProperties": {}, "evaluations": {} } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::debugger::Controller;
use crate::engine::{DebugEvent, Handle, HandleFixture, PauseState, ScriptFixture, ScriptedEngine};
use crate::error::ReplayError;
use crate::output::Verdict;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub config: ControllerConfig,
    /// Start with a source rundown instead of one compile event per script.
    #[serde(default)]
    pub attach: bool,
    #[serde(default)]
    pub scripts: Vec<ScriptFixture>,
    #[serde(default)]
    pub handles: BTreeMap<Handle, HandleFixture>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One engine event and what the debuggee looks like while it is handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub event: DebugEvent,
    #[serde(default)]
    pub pause: PauseState,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let text = fs::read_to_string(path).map_err(|source| ReplayError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn engine(&self) -> ScriptedEngine {
        let mut engine = ScriptedEngine::new();
        for script in &self.scripts {
            engine.add_script(script.clone());
        }
        for (handle, fixture) in &self.handles {
            engine.add_handle(*handle, fixture.clone());
        }
        engine
    }
}

/// A scenario being replayed one step at a time.
#[derive(Debug)]
pub struct Replay {
    controller: Controller<ScriptedEngine>,
    steps: Vec<Step>,
    next: usize,
}

impl Replay {
    /// Builds the controller and loads every non-deferred script.
    pub fn new(scenario: Scenario) -> Self {
        let mut controller = Controller::with_config(scenario.engine(), &scenario.config);
        let startup: Vec<_> = scenario
            .scripts
            .iter()
            .filter(|script| !script.deferred)
            .map(ScriptFixture::info)
            .collect();

        if scenario.attach {
            controller.handle_source_rundown(&startup);
        } else {
            for script in &startup {
                controller.handle_debug_event(DebugEvent::SourceCompile {
                    script_id: script.script_id,
                });
            }
        }
        tracing::debug!(
            scripts = startup.len(),
            steps = scenario.steps.len(),
            "scenario loaded"
        );

        Self {
            controller,
            steps: scenario.steps,
            next: 0,
        }
    }

    /// Dispatches the next step. Returns `false` once every step ran.
    pub fn step(&mut self) -> bool {
        let Some(step) = self.steps.get(self.next).cloned() else {
            return false;
        };
        self.next += 1;
        self.controller.engine_mut().load_pause(step.pause);
        self.controller.handle_debug_event(step.event);
        true
    }

    pub fn run_to_end(&mut self) {
        while self.step() {}
    }

    pub fn remaining(&self) -> usize {
        self.steps.len() - self.next
    }

    pub fn controller(&self) -> &Controller<ScriptedEngine> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<ScriptedEngine> {
        &mut self.controller
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub output: String,
    pub verdict: Verdict,
    pub diagnostics: Vec<String>,
}

/// Replays every step and verifies against `baseline` when given. An
/// invalid baseline is reported in the diagnostics and verification passes.
pub fn run(scenario: Scenario, baseline: Option<&str>) -> ReplayOutcome {
    let mut replay = Replay::new(scenario);
    if let Some(baseline) = baseline {
        // Already reported; the run continues without a baseline.
        let _ = replay.controller_mut().set_baseline(baseline);
    }
    replay.run_to_end();

    let controller = replay.controller_mut();
    let verdict = controller.verify();
    ReplayOutcome {
        output: controller.get_output_json(),
        verdict,
        diagnostics: controller.diagnostics().to_vec(),
    }
}
