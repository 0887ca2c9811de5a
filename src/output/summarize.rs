use serde_json::{Map, Value};

use crate::config::{DEFAULT_INSPECT_MAX_STRING_LENGTH, DEFAULT_PROPERTY_PAGE_SIZE};
use crate::engine::{DebugEngine, PropertyValue};

/// Renders engine values as plain JSON.
///
/// A value without children becomes a one-line string such as
/// `"number 42"`. A value with a handle is expanded into an object keyed by
/// property name while `depth >= 0`, each child one level shallower. Handles
/// never appear in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummarizer {
    max_string_length: usize,
    page_size: u32,
}

impl Default for ObjectSummarizer {
    fn default() -> Self {
        Self::new(DEFAULT_INSPECT_MAX_STRING_LENGTH, DEFAULT_PROPERTY_PAGE_SIZE)
    }
}

impl ObjectSummarizer {
    pub fn new(max_string_length: usize, page_size: u32) -> Self {
        Self {
            max_string_length,
            page_size,
        }
    }

    pub fn set_max_string_length(&mut self, length: usize) {
        self.max_string_length = length;
    }

    pub fn summarize<E: DebugEngine>(
        &self,
        engine: &mut E,
        value: &PropertyValue,
        depth: i64,
    ) -> Value {
        let Some(handle) = value.handle.filter(|_| depth >= 0) else {
            return Value::String(self.render_leaf(value));
        };

        let page = match engine.get_properties(handle, 0, self.page_size) {
            Ok(page) => page,
            Err(err) => {
                tracing::debug!(handle, %err, "property fetch failed");
                return Value::Object(Map::new());
            }
        };
        if page.properties.is_empty() && page.debugger_only_properties.is_empty() {
            return Value::String(self.render_leaf(value));
        }

        let mut children = Map::new();
        for child in page
            .properties
            .iter()
            .chain(page.debugger_only_properties.iter())
        {
            let rendered = self.summarize(engine, child, depth - 1);
            children.insert(property_key(&child.name), rendered);
        }
        Value::Object(children)
    }

    /// `"<className|type> <value|display>"`, or a placeholder for long strings.
    pub fn render_leaf(&self, value: &PropertyValue) -> String {
        let kind = value.class_name.as_deref().unwrap_or(&value.type_name);
        let text = match (&value.value, &value.display) {
            (Some(Value::String(s)), _) => s.clone(),
            (Some(other), _) => other.to_string(),
            (None, Some(display)) => display.clone(),
            (None, None) => String::new(),
        };

        if value.type_name == "string" && text.chars().count() > self.max_string_length {
            return format!("{kind} <large string>");
        }
        if text.is_empty() {
            return kind.to_string();
        }
        format!("{kind} {text}")
    }
}

fn property_key(name: &str) -> String {
    if name == "__proto__" {
        "#__proto__".to_string()
    } else {
        name.to_string()
    }
}
