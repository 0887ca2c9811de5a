use serde_json::Value;

/// Host and intrinsic globals that would make every `locals()` dump depend
/// on the engine build.
pub const FILTERED_NAMES: &[&str] = &[
    "WScript",
    "print",
    "read",
    "readbuffer",
    "console",
    "Debug",
    "SCA",
    "ImageData",
    "Intl",
    "JSON",
    "Math",
    "Reflect",
    "Atomics",
    "WebAssembly",
    "SharedArrayBuffer",
    "hostDebugObject",
    "controllerObj",
    "TRACE_COMMANDS",
    "TRACE_DIAG_OUTPUT",
    "TRACE_INTERNAL_FUNCTIONS",
    "TRACE_DEBUG_EVENTS",
    "TRACE_ALL",
];

/// Parent keys under which [`FILTERED_NAMES`] are removed. Deeper nodes keep
/// them.
const FILTERED_PARENTS: [&str; 3] = ["this", "locals", "globals"];

/// Ordered, append-only log of structured output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventLog {
    entries: Vec<Value>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, mut entry: Value) {
        filter(&mut entry, None);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The whole log as a pretty-printed JSON array (two-space indent).
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.entries).unwrap_or_else(|_| "[]".to_string())
    }
}

fn filter(node: &mut Value, parent: Option<&str>) {
    match node {
        Value::Object(map) => {
            if parent.is_some_and(|key| FILTERED_PARENTS.contains(&key)) {
                map.retain(|key, _| !FILTERED_NAMES.contains(&key.as_str()));
            }
            for (key, child) in map.iter_mut() {
                filter(child, Some(key.as_str()));
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter_mut().enumerate() {
                filter(child, Some(index.to_string().as_str()));
            }
        }
        _ => {}
    }
}
