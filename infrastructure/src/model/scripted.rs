//! Scripted model gateway.
//!
//! Replays a fixed list of replies, one per model call. Used to drive the
//! dispatch loop without a network model, from tests and from the CLI's
//! `--script` option.
//!
//! # Script format
//!
//! A JSON array; each entry is either a text answer or a list of tool calls:
//!
//! ```json
//! [
//!   { "tool_calls": [{ "name": "poem", "arguments": { "line_count": 3 } }] },
//!   { "text": "Here is your poem." }
//! ]
//! ```
//!
//! Tool calls may carry an `"id"`; otherwise the dispatch loop assigns one.

use async_trait::async_trait;
use bridge_application::ports::model_gateway::{GatewayError, ModelGateway, ModelRequest};
use bridge_domain::{ModelReply, ToolCallRequest};
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

/// Errors loading a script
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Could not read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptEntry {
    Text { text: String },
    ToolCalls { tool_calls: Vec<ScriptedCall> },
}

#[derive(Deserialize)]
struct ScriptedCall {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

impl From<ScriptEntry> for ModelReply {
    fn from(entry: ScriptEntry) -> Self {
        match entry {
            ScriptEntry::Text { text } => ModelReply::Text(text),
            ScriptEntry::ToolCalls { tool_calls } => ModelReply::ToolCalls(
                tool_calls
                    .into_iter()
                    .map(|call| {
                        let mut request = ToolCallRequest::new(call.name);
                        if let Some(id) = call.id {
                            request = request.with_call_id(id);
                        }
                        if let Some(arguments) = call.arguments {
                            request = request.with_arguments(arguments);
                        }
                        request
                    })
                    .collect(),
            ),
        }
    }
}

/// Model gateway that replays recorded replies in order.
pub struct ScriptedModel {
    model_id: String,
    replies: Mutex<VecDeque<ModelReply>>,
}

impl ScriptedModel {
    pub fn new(model_id: impl Into<String>, replies: Vec<ModelReply>) -> Self {
        Self {
            model_id: model_id.into(),
            replies: Mutex::new(VecDeque::from(replies)),
        }
    }

    /// Parse a script from its JSON text.
    pub fn from_json(model_id: impl Into<String>, script: &str) -> Result<Self, ScriptError> {
        let entries: Vec<ScriptEntry> = serde_json::from_str(script)?;
        Ok(Self::new(
            model_id,
            entries.into_iter().map(ModelReply::from).collect(),
        ))
    }

    /// Load a script file.
    pub fn from_file(
        model_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let script = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(model_id, &script)
    }

    /// Number of replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ModelGateway for ScriptedModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn send(&self, request: ModelRequest<'_>) -> Result<ModelReply, GatewayError> {
        let next = self
            .replies
            .lock()
            .map_err(|_| GatewayError::Other("script state poisoned".to_string()))?
            .pop_front();

        debug!(
            model = %self.model_id,
            history = request.history.len(),
            "Scripted model replying"
        );

        next.ok_or_else(|| {
            GatewayError::ModelNotAvailable(format!("script for '{}' is exhausted", self.model_id))
        })
    }
}
