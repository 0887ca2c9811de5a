use std::fmt;

use serde_json::Value;

use crate::error::ControllerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn passed(self) -> bool {
        self == Verdict::Pass
    }
}

/// One difference between the expected and the actual log.
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    /// `expected` is `None` when the actual value has a key the baseline lacks.
    Value {
        path: String,
        expected: Option<Value>,
        actual: Value,
    },
    /// Present in the baseline, absent from the actual log.
    Missing { path: String, expected: Value },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Value {
                path,
                expected,
                actual,
            } => {
                let expected = expected
                    .as_ref()
                    .map_or_else(|| "undefined".to_string(), Value::to_string);
                write!(f, "{path}: expected {expected}, found {actual}")
            }
            Mismatch::Missing { path, expected } => {
                write!(f, "{path}: missing property (expected {expected})")
            }
        }
    }
}

/// A previously captured event log.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    expected: Value,
}

impl Baseline {
    pub fn new(expected: Value) -> Self {
        Self { expected }
    }

    pub fn parse(text: &str) -> Result<Self, ControllerError> {
        serde_json::from_str(text)
            .map(Self::new)
            .map_err(ControllerError::InvalidBaseline)
    }

    pub fn expected(&self) -> &Value {
        &self.expected
    }

    /// Structural differences, in discovery order. Empty means a match.
    pub fn compare(&self, actual: &Value) -> Vec<Mismatch> {
        let mut mismatches = Vec::new();
        compare_node("$", Some(&self.expected), actual, &mut mismatches);
        mismatches
    }
}

fn compare_node(path: &str, expected: Option<&Value>, actual: &Value, out: &mut Vec<Mismatch>) {
    if expected == Some(actual) {
        return;
    }

    match (expected, actual) {
        (Some(Value::Object(expected)), Value::Object(actual)) => {
            for (key, value) in actual {
                compare_node(&format!("{path}.{key}"), expected.get(key), value, out);
            }
            for (key, value) in expected {
                if !actual.contains_key(key) {
                    out.push(Mismatch::Missing {
                        path: format!("{path}.{key}"),
                        expected: value.clone(),
                    });
                }
            }
        }
        (Some(Value::Array(expected)), Value::Array(actual)) => {
            for (index, value) in actual.iter().enumerate() {
                compare_node(&format!("{path}[{index}]"), expected.get(index), value, out);
            }
            for (index, value) in expected.iter().enumerate().skip(actual.len()) {
                out.push(Mismatch::Missing {
                    path: format!("{path}[{index}]"),
                    expected: value.clone(),
                });
            }
        }
        _ => out.push(Mismatch::Value {
            path: path.to_string(),
            expected: expected.cloned(),
            actual: actual.clone(),
        }),
    }
}
