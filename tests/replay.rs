use std::fs;

use script_debugger::output::Verdict;
use script_debugger::replay::{self, Replay, Scenario};
use serde_json::{json, Value};

const SCENARIO: &str = r#"{
  "config": { "inspectMaxStringLength": 5 },
  "scripts": [
    {
      "scriptId": 1,
      "fileName": "c:\\tests\\replay.js",
      "source": "function f(a) {\n  return a; /**bp:locals();evaluate('name');stack()**/\n}\n"
    },
    { "scriptId": 2, "source": "/**bp:log('late')**/", "deferred": true }
  ],
  "handles": {
    "7": { "object": { "name": "f", "type": "function" } }
  },
  "steps": [
    {
      "event": { "kind": "breakpoint", "breakpointId": 1 },
      "pause": {
        "stackTrace": [
          { "index": 0, "line": 1, "column": 2, "sourceText": "return a;", "functionHandle": 7 }
        ],
        "stackProperties": {
          "locals": [{ "name": "a", "type": "number", "value": 3 }]
        },
        "evaluations": {
          "name": { "result": { "name": "name", "type": "string", "value": "a long name" } }
        }
      }
    },
    { "event": { "kind": "stepComplete" } }
  ]
}"#;

fn expected_log() -> Value {
    json!([
        { "locals": { "a": "number 3" } },
        { "evaluate": { "name": "string <large string>" } },
        { "callStack": [{ "line": 1, "column": 2, "sourceText": "return a;", "function": "f" }] }
    ])
}

#[cfg(test)]
mod replay_tests {
    use super::*;

    #[test]
    fn test_scenario_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        fs::write(&path, SCENARIO).unwrap();

        let scenario = Scenario::load(&path).unwrap();

        assert_eq!(scenario.scripts.len(), 2);
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.config.inspect_max_string_length, 5);
        assert_eq!(scenario.config.property_page_size, 1000);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"));
    }

    #[test]
    fn test_run_matches_baseline() {
        let scenario = Scenario::from_json(SCENARIO).unwrap();
        let baseline = expected_log().to_string();

        let outcome = replay::run(scenario, Some(&baseline));

        assert_eq!(outcome.verdict, Verdict::Pass);
        assert!(outcome.diagnostics.is_empty());
        let output: Value = serde_json::from_str(&outcome.output).unwrap();
        assert_eq!(output, expected_log());
    }

    #[test]
    fn test_run_reports_mismatch() {
        let scenario = Scenario::from_json(SCENARIO).unwrap();
        let baseline = json!([{ "locals": { "a": "number 4" } }]).to_string();

        let outcome = replay::run(scenario, Some(&baseline));

        assert_eq!(outcome.verdict, Verdict::Fail);
        assert!(outcome
            .diagnostics
            .iter()
            .any(|line| line.contains("$[0].locals.a")));
    }

    #[test]
    fn test_invalid_baseline_still_replays() {
        let scenario = Scenario::from_json(SCENARIO).unwrap();

        let outcome = replay::run(scenario, Some("{"));

        assert_eq!(outcome.verdict, Verdict::Pass);
        let output: Value = serde_json::from_str(&outcome.output).unwrap();
        assert_eq!(output, expected_log());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|line| line.contains("Invalid JSON passed to setBaseline")));
    }

    #[test]
    fn test_deferred_scripts_are_not_compiled() {
        let replay = Replay::new(Scenario::from_json(SCENARIO).unwrap());

        assert_eq!(replay.controller().breakpoints().len(), 1);
        assert_eq!(replay.controller().engine().count_calls("getSource"), 1);
        assert_eq!(replay.remaining(), 2);
    }

    #[test]
    fn test_attach_uses_rundown() {
        let mut scenario = Scenario::from_json(SCENARIO).unwrap();
        scenario.attach = true;
        scenario.scripts[1].deferred = false;

        let mut replay = Replay::new(scenario);
        assert_eq!(replay.controller().breakpoints().len(), 2);

        replay.run_to_end();
        assert_eq!(replay.remaining(), 0);
        assert!(!replay.step());
    }
}
