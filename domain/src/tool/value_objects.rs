//! Tool domain value objects: call results and per-call errors
//!
//! Every invocation produces a [`ToolCallResult`]. Failures that the model can
//! react to (unknown tool, bad arguments, handler errors) travel inside the
//! result as a [`ToolError`] and are fed back into the conversation.
//! [`OutputEncodeError`] is different: it means a handler produced output that
//! does not match its own schema, and it aborts the current response.

use super::schema::SchemaViolation;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Category of a recoverable tool failure.
///
/// | Kind | Code | Cause |
/// |------|------|-------|
/// | `UnknownTool` | `UNKNOWN_TOOL` | No tool registered under the requested name |
/// | `ArgumentDecode` | `INVALID_ARGUMENT` | Arguments do not conform to the input schema |
/// | `Handler` | `HANDLER_FAILED` | The handler returned an error or timed out |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    UnknownTool,
    ArgumentDecode,
    Handler,
}

impl ToolErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ToolErrorKind::UnknownTool => "UNKNOWN_TOOL",
            ToolErrorKind::ArgumentDecode => "INVALID_ARGUMENT",
            ToolErrorKind::Handler => "HANDLER_FAILED",
        }
    }
}

/// A recoverable failure of a single tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::UnknownTool,
            format!("Unknown tool: {}", name.into()),
        )
    }

    pub fn argument_decode(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ArgumentDecode, message)
    }

    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Handler, message)
    }

    pub fn timeout(tool_name: &str, seconds: f64) -> Self {
        Self::new(
            ToolErrorKind::Handler,
            format!("Tool '{}' timed out after {:.1}s", tool_name, seconds),
        )
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for ToolError {}

/// Structured metadata about a tool execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Wall-clock duration of the handler in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Outcome of one tool call: exactly one of `output` or `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub call_id: String,
    pub tool_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

impl ToolCallResult {
    pub fn success(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: Value,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            output: Some(output),
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn failure(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        error: ToolError,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            output: None,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// The value handed back to the model for this call.
    ///
    /// Successful calls yield the handler output as-is; failures yield
    /// `{"error": {"code": .., "message": ..}}`.
    pub fn to_model_payload(&self) -> Value {
        match (&self.output, &self.error) {
            (_, Some(error)) => json!({
                "error": { "code": error.code(), "message": error.message }
            }),
            (Some(output), None) => output.clone(),
            (None, None) => Value::Null,
        }
    }
}

/// A handler produced output that does not conform to its own output schema.
///
/// This is an internal-consistency failure, not something the model can
/// correct, so it is returned instead of being folded into a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Output of tool '{tool_name}' violates its schema: {reason}")]
pub struct OutputEncodeError {
    pub tool_name: String,
    pub reason: String,
}

impl OutputEncodeError {
    pub fn new(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            reason: reason.into(),
        }
    }

    pub fn from_violation(tool_name: impl Into<String>, violation: &SchemaViolation) -> Self {
        Self::new(tool_name, violation.to_string())
    }
}
