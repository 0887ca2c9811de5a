use script_debugger::engine::{HandleFixture, PropertyValue, ScriptedEngine};
use serde_json::json;

// Helper to build a plain value as the engine reports it
fn value(name: &str, type_name: &str, raw: serde_json::Value) -> PropertyValue {
    PropertyValue {
        name: name.to_string(),
        type_name: type_name.to_string(),
        value: Some(raw),
        ..Default::default()
    }
}

// Helper to build an object value with children behind `handle`
fn object(name: &str, handle: u32) -> PropertyValue {
    PropertyValue {
        name: name.to_string(),
        type_name: "object".to_string(),
        class_name: Some("Object".to_string()),
        display: Some("{...}".to_string()),
        handle: Some(handle),
        ..Default::default()
    }
}

fn engine_with_script() -> ScriptedEngine {
    ScriptedEngine::new().with_script(1, "c:\\tests\\sample.js", "var x = 1;\nvar y = 2;\n")
}

#[cfg(test)]
mod annotation_tests {
    use script_debugger::engine::ExceptionMode;
    use script_debugger::error::ParseError;
    use script_debugger::parser::{scan, DirectiveKind};

    #[test]
    fn test_plain_breakpoint() {
        let result = scan("var a = 1;\nvar b = 2; /**bp**/\nvar c = 3;");

        assert!(result.error.is_none());
        assert_eq!(result.directives.len(), 1);
        let directive = &result.directives[0];
        assert_eq!(directive.kind, DirectiveKind::Breakpoint);
        assert_eq!(directive.line, 1);
        assert_eq!(directive.column_offset, None);
        assert_eq!(directive.name, None);
        assert_eq!(directive.command_text, None);
    }

    #[test]
    fn test_named_breakpoint_with_commands() {
        let result = scan("foo(); /**bp(first):locals(1);stack()**/");

        let directive = &result.directives[0];
        assert_eq!(directive.name.as_deref(), Some("first"));
        assert_eq!(directive.command_text.as_deref(), Some("locals(1);stack()"));
    }

    #[test]
    fn test_column_offset_is_clamped() {
        let result = scan("    foo(); /**bp(4)**/\nx;/**bp(99)**/");

        assert_eq!(result.directives[0].column_offset, Some(4));
        assert_eq!(result.directives[0].name, None);
        // "x;/**bp(99)**/" is 14 characters long
        assert_eq!(result.directives[1].column_offset, Some(13));
    }

    #[test]
    fn test_column_offset_ignores_carriage_return() {
        let result = scan("x;/**bp(99)**/\r\ny;\r\n");

        assert!(result.error.is_none());
        assert_eq!(result.directives[0].column_offset, Some(13));
    }

    #[test]
    fn test_unterminated_at_end_of_text() {
        let result = scan("var a;/**bp:locals()\nvar b;\n");

        assert_eq!(result.error, Some(ParseError::Unterminated { line: 0 }));
        assert!(result.directives.is_empty());
    }

    #[test]
    fn test_unterminated_before_next_directive() {
        let result = scan("var a; /**bp:locals()\nvar b; /**bp**/");

        assert_eq!(result.error, Some(ParseError::Unterminated { line: 0 }));
        assert!(result.directives.is_empty());
    }

    #[test]
    fn test_directives_before_error_are_kept() {
        let result = scan("/**bp**/\n/**bp:stack()");

        assert_eq!(result.directives.len(), 1);
        assert_eq!(result.error, Some(ParseError::Unterminated { line: 1 }));
    }

    #[test]
    fn test_multi_line_directive() {
        let result = scan("foo(); /**bp:locals();\nstack()**/\nbar(); /**bp**/");

        assert!(result.error.is_none());
        assert_eq!(result.directives.len(), 2);
        assert_eq!(
            result.directives[0].command_text.as_deref(),
            Some("locals();stack()")
        );
        assert_eq!(result.directives[0].line, 0);
        assert_eq!(result.directives[1].line, 2);
    }

    #[test]
    fn test_directive_inside_string_is_skipped() {
        let inside = scan("var x = \"/**bp**/\";");
        assert!(inside.directives.is_empty());
        assert!(inside.error.is_none());

        let outside = scan("/**bp**/ var x = \"a\";");
        assert_eq!(outside.directives.len(), 1);
    }

    #[test]
    fn test_location_requires_name() {
        let result = scan("/**loc**/");
        assert_eq!(
            result.error,
            Some(ParseError::MissingLocationName { line: 0 })
        );

        let named = scan("/**loc(foo):locals()**/");
        assert_eq!(named.directives[0].kind, DirectiveKind::Location);
        assert_eq!(named.directives[0].name.as_deref(), Some("foo"));
    }

    #[test]
    fn test_exception_modes() {
        let result = scan("/**exception(all):stack()**/");
        let directive = &result.directives[0];
        assert_eq!(directive.kind, DirectiveKind::Exception(ExceptionMode::All));
        assert_eq!(directive.name, None);
        assert_eq!(directive.command_text.as_deref(), Some("stack()"));

        let invalid = scan("/**exception(sometimes)**/");
        assert!(matches!(
            invalid.error,
            Some(ParseError::InvalidExceptionMode { line: 0, .. })
        ));
    }

    #[test]
    fn test_malformed_directives() {
        assert!(matches!(
            scan("/**bp junk**/").error,
            Some(ParseError::InvalidDirective { line: 0, .. })
        ));
        assert!(matches!(
            scan("/**bp(a b)**/").error,
            Some(ParseError::InvalidParameter { line: 0, .. })
        ));
    }

    #[test]
    fn test_onasyncbreak() {
        let result = scan("/**onasyncbreak:log('async')**/");
        assert_eq!(result.directives[0].kind, DirectiveKind::OnAsyncBreak);
        assert_eq!(
            result.directives[0].command_text.as_deref(),
            Some("log('async')")
        );
    }
}

#[cfg(test)]
mod breakpoint_table_tests {
    use super::*;
    use script_debugger::debugger::{BreakpointId, BreakpointRequest, BreakpointTable};
    use script_debugger::error::BreakpointError;

    fn request(name: &str, line: u32) -> BreakpointRequest {
        BreakpointRequest {
            name: Some(name.to_string()),
            script_id: 1,
            line,
            column: 0,
            command_text: Some("locals()".to_string()),
        }
    }

    #[test]
    fn test_set_uses_engine_ids() {
        let mut engine = engine_with_script();
        let mut table = BreakpointTable::new();

        let id = table.set(&mut engine, request("a", 1)).unwrap();

        assert_eq!(id, BreakpointId::Engine(1));
        assert_eq!(engine.live_breakpoints().len(), 1);
        assert_eq!(table.command_text(id).unwrap(), Some("locals()"));
    }

    #[test]
    fn test_location_stays_out_of_engine() {
        let mut engine = engine_with_script();
        let mut table = BreakpointTable::new();

        let first = table.set_location(request("a", 1));
        let second = table.set_location(request("b", 2));

        assert_eq!(first, BreakpointId::Placeholder(1));
        assert_eq!(second, BreakpointId::Placeholder(2));
        assert!(engine.calls().is_empty());
        assert!(!table.get(first).unwrap().enabled);

        let enabled = table.enable(&mut engine, "a").unwrap();
        assert_eq!(enabled, BreakpointId::Engine(1));
        assert_eq!(engine.count_calls("setBreakpoint"), 1);
        assert!(table.get(first).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_disable_then_enable_recreates() {
        let mut engine = engine_with_script();
        let mut table = BreakpointTable::new();
        table.set(&mut engine, request("a", 1)).unwrap();

        table.disable(&mut engine, "a").unwrap();
        assert!(engine.live_breakpoints().is_empty());
        let record = table.find_by_name("a").unwrap();
        assert!(!record.enabled);
        assert_eq!(record.line, 1);
        assert_eq!(record.command_text.as_deref(), Some("locals()"));

        let id = table.enable(&mut engine, "a").unwrap();
        assert_eq!(id, BreakpointId::Engine(2));
        assert_eq!(engine.live_breakpoints().len(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_enable_twice_is_a_no_op() {
        let mut engine = engine_with_script();
        let mut table = BreakpointTable::new();
        let id = table.set(&mut engine, request("a", 1)).unwrap();

        assert_eq!(table.enable(&mut engine, "a").unwrap(), id);
        assert_eq!(engine.count_calls("setBreakpoint"), 1);
    }

    #[test]
    fn test_delete_forgets() {
        let mut engine = engine_with_script();
        let mut table = BreakpointTable::new();
        table.set(&mut engine, request("a", 1)).unwrap();
        table.set_location(request("b", 2));

        table.delete(&mut engine, "a").unwrap();
        table.delete(&mut engine, "b").unwrap();

        assert!(table.is_empty());
        assert_eq!(engine.count_calls("removeBreakpoint"), 1);
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let mut engine = engine_with_script();
        let mut table = BreakpointTable::new();

        assert_eq!(
            table.enable(&mut engine, "missing"),
            Err(BreakpointError::NotFound("missing".to_string()))
        );
        assert!(table.command_text(BreakpointId::Engine(9)).is_err());
    }

    #[test]
    fn test_clear_all_resets_placeholders() {
        let mut table = BreakpointTable::new();
        table.set_location(request("a", 1));
        table.set_location(request("b", 2));

        table.clear_all();
        assert!(table.is_empty());
        assert_eq!(table.set_location(request("c", 3)), BreakpointId::Placeholder(1));
    }
}

#[cfg(test)]
mod summarizer_tests {
    use super::*;
    use script_debugger::output::ObjectSummarizer;

    fn engine_with_object() -> ScriptedEngine {
        let mut engine = ScriptedEngine::new();
        engine.add_handle(
            5,
            HandleFixture {
                object: object("obj", 5),
                properties: vec![value("a", "number", json!(1)), object("inner", 6)],
                debugger_only_properties: vec![PropertyValue {
                    name: "__proto__".to_string(),
                    type_name: "object".to_string(),
                    class_name: Some("Object".to_string()),
                    display: Some("{...}".to_string()),
                    ..Default::default()
                }],
            },
        );
        engine.add_handle(
            6,
            HandleFixture {
                object: object("inner", 6),
                properties: vec![value("b", "boolean", json!(true))],
                debugger_only_properties: Vec::new(),
            },
        );
        engine.add_handle(7, HandleFixture::default());
        engine
    }

    #[test]
    fn test_leaf_rendering() {
        let summarizer = ObjectSummarizer::default();

        assert_eq!(
            summarizer.render_leaf(&value("n", "number", json!(42))),
            "number 42"
        );
        assert_eq!(
            summarizer.render_leaf(&value("s", "string", json!("short"))),
            "string short"
        );
        assert_eq!(summarizer.render_leaf(&object("o", 1)), "Object {...}");
    }

    #[test]
    fn test_large_strings() {
        let summarizer = ObjectSummarizer::default();

        assert_eq!(
            summarizer.render_leaf(&value("s", "string", json!("0123456789abcdef"))),
            "string 0123456789abcdef"
        );
        assert_eq!(
            summarizer.render_leaf(&value("s", "string", json!("0123456789abcdefg"))),
            "string <large string>"
        );
    }

    #[test]
    fn test_depth_controls_expansion() {
        let mut engine = engine_with_object();
        let summarizer = ObjectSummarizer::default();
        let obj = object("obj", 5);

        assert_eq!(
            summarizer.summarize(&mut engine, &obj, -1),
            json!("Object {...}")
        );
        assert_eq!(
            summarizer.summarize(&mut engine, &obj, 0),
            json!({ "a": "number 1", "inner": "Object {...}", "#__proto__": "Object {...}" })
        );
        assert_eq!(
            summarizer.summarize(&mut engine, &obj, 1),
            json!({
                "a": "number 1",
                "inner": { "b": "boolean true" },
                "#__proto__": "Object {...}"
            })
        );
    }

    #[test]
    fn test_page_request() {
        let mut engine = engine_with_object();
        ObjectSummarizer::default().summarize(&mut engine, &object("obj", 5), 0);

        assert_eq!(
            engine.calls()[0],
            script_debugger::engine::EngineCall::GetProperties {
                handle: 5,
                start: 0,
                count: 1000
            }
        );
    }

    #[test]
    fn test_empty_and_failing_objects() {
        let mut engine = engine_with_object();
        let summarizer = ObjectSummarizer::default();

        assert_eq!(
            summarizer.summarize(&mut engine, &object("empty", 7), 3),
            json!("Object {...}")
        );

        engine.fail_operation("getProperties");
        assert_eq!(summarizer.summarize(&mut engine, &object("obj", 5), 0), json!({}));
    }
}

#[cfg(test)]
mod event_log_tests {
    use script_debugger::output::{file_basename, EventLog};
    use serde_json::json;

    #[test]
    fn test_filters_globals_under_scoped_parents() {
        let mut log = EventLog::new();
        log.record(json!({
            "locals": { "WScript": "Object {...}", "a": "number 1" },
            "globals": { "Math": "Object {...}", "mine": "number 2" },
        }));

        assert_eq!(
            log.entries()[0],
            json!({ "locals": { "a": "number 1" }, "globals": { "mine": "number 2" } })
        );
    }

    #[test]
    fn test_filter_is_shallow() {
        let mut log = EventLog::new();
        log.record(json!({ "locals": { "obj": { "Math": "Object {...}" } } }));
        log.record(json!({ "evaluate": { "WScript": "Object {...}" } }));

        assert_eq!(
            log.entries()[0],
            json!({ "locals": { "obj": { "Math": "Object {...}" } } })
        );
        assert_eq!(log.entries()[1], json!({ "evaluate": { "WScript": "Object {...}" } }));
    }

    #[test]
    fn test_output_json_round_trip() {
        let mut log = EventLog::new();
        log.record(json!({ "log": "one" }));
        log.record(json!({ "callStack": [{ "line": 1, "column": 2 }] }));

        let text = log.to_json();
        assert!(text.starts_with("[\n  {"));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, serde_json::Value::Array(log.entries().to_vec()));
    }

    #[test]
    fn test_file_basename() {
        assert_eq!(file_basename("c:\\tests\\sample.js"), "sample.js");
        assert_eq!(file_basename("/home/tests/sample.js"), "sample.js");
        assert_eq!(file_basename("sample.js"), "sample.js");
    }
}

#[cfg(test)]
mod baseline_tests {
    use script_debugger::output::{Baseline, Mismatch};
    use serde_json::json;

    #[test]
    fn test_equal_values_pass() {
        let baseline = Baseline::new(json!([{ "a": 1 }]));
        assert!(baseline.compare(&json!([{ "a": 1 }])).is_empty());
    }

    #[test]
    fn test_missing_property() {
        let baseline = Baseline::new(json!({ "a": 1, "b": 2 }));

        assert_eq!(
            baseline.compare(&json!({ "a": 1 })),
            vec![Mismatch::Missing {
                path: "$.b".to_string(),
                expected: json!(2),
            }]
        );
    }

    #[test]
    fn test_value_and_extra_key_mismatches() {
        let baseline = Baseline::new(json!({ "a": 1 }));

        let mismatches = baseline.compare(&json!({ "a": 2, "c": 3 }));
        assert_eq!(
            mismatches,
            vec![
                Mismatch::Value {
                    path: "$.a".to_string(),
                    expected: Some(json!(1)),
                    actual: json!(2),
                },
                Mismatch::Value {
                    path: "$.c".to_string(),
                    expected: None,
                    actual: json!(3),
                },
            ]
        );
        assert_eq!(mismatches[1].to_string(), "$.c: expected undefined, found 3");
    }

    #[test]
    fn test_arrays_compare_by_index() {
        let baseline = Baseline::new(json!([1, 2, 3]));

        assert_eq!(
            baseline.compare(&json!([1, 5])),
            vec![
                Mismatch::Value {
                    path: "$[1]".to_string(),
                    expected: Some(json!(2)),
                    actual: json!(5),
                },
                Mismatch::Missing {
                    path: "$[2]".to_string(),
                    expected: json!(3),
                },
            ]
        );
    }

    #[test]
    fn test_invalid_baseline_text() {
        assert!(Baseline::parse("{ not json").is_err());
    }
}
