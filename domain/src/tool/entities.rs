//! Tool domain entities
//!
//! A [`ToolDescriptor`] is what the model is told about a tool. A
//! [`ToolCallRequest`] is what the model sends back when it wants one run.

use super::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Immutable description of a registered tool.
///
/// Created by the registry at registration time; the input and output schemas
/// are inferred from the handler's types and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name (e.g., "poem")
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    pub input_schema: Schema,
    pub output_schema: Schema,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Schema,
        output_schema: Schema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            output_schema,
        }
    }

    /// Names of required input fields.
    pub fn required_inputs(&self) -> Vec<&str> {
        self.input_schema.required_fields().collect()
    }
}

/// A model's request to execute a tool.
///
/// `arguments` is kept as raw JSON: the model may send anything, and it is the
/// invoker's job to validate it against the tool's input schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlates the request with its result. Empty until assigned.
    #[serde(default)]
    pub call_id: String,
    pub tool_name: String,
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

impl ToolCallRequest {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            tool_name: tool_name.into(),
            arguments: empty_arguments(),
        }
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = call_id.into();
        self
    }

    /// Replace the whole argument value.
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }

    /// Set a single argument. Non-object arguments are replaced by an object.
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !self.arguments.is_object() {
            self.arguments = empty_arguments();
        }
        if let Value::Object(map) = &mut self.arguments {
            map.insert(key.into(), value.into());
        }
        self
    }

    pub fn has_call_id(&self) -> bool {
        !self.call_id.is_empty()
    }

    pub fn get_arg(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get_arg(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_arg(key).and_then(Value::as_i64)
    }
}
