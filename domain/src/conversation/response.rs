//! Model reply types.
//!
//! A model either answers in text or asks for one or more tools to be run.
//! An empty tool-call list carries no request, so it is normalized to an empty
//! text answer.

use crate::tool::entities::ToolCallRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelReply {
    Text(String),
    ToolCalls(Vec<ToolCallRequest>),
}

impl ModelReply {
    pub fn text(content: impl Into<String>) -> Self {
        ModelReply::Text(content.into())
    }

    pub fn tool_call(request: ToolCallRequest) -> Self {
        ModelReply::ToolCalls(vec![request])
    }

    /// Collapse an empty `ToolCalls` into `Text("")`.
    pub fn normalized(self) -> Self {
        match self {
            ModelReply::ToolCalls(calls) if calls.is_empty() => ModelReply::Text(String::new()),
            other => other,
        }
    }

    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            ModelReply::ToolCalls(calls) => calls,
            ModelReply::Text(_) => &[],
        }
    }
}
