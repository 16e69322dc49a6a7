//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//!
//! ```toml
//! [agent]
//! name = "poet_agent"
//! description = "Writes poems on request"
//! instruction = "When asked to write a poem, you MUST use the poem tool."
//! max_turns = 10
//! tool_timeout_seconds = 30
//!
//! [model]
//! id = "scripted"
//! script = "replies.json"
//!
//! [telemetry]
//! trace_file = "out.jsonl"
//! ```

use bridge_application::{DEFAULT_MAX_TURNS, ExecutionParams};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("agent.name cannot be empty")]
    EmptyAgentName,

    #[error("agent.max_turns must be at least 1")]
    ZeroMaxTurns,

    #[error("agent.tool_timeout_seconds cannot be 0")]
    InvalidToolTimeout,

    #[error("model.id cannot be empty")]
    EmptyModelId,
}

/// Raw agent configuration from TOML (`[agent]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub name: String,
    pub description: String,
    /// System instruction sent with every model call
    pub instruction: String,
    /// Maximum model calls per response
    pub max_turns: usize,
    /// Per-call tool timeout in seconds
    pub tool_timeout_seconds: Option<u64>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            name: "poet_agent".to_string(),
            description: "Writes poems on request".to_string(),
            instruction: "When asked to write a poem, you MUST use the poem tool to write it."
                .to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            tool_timeout_seconds: None,
        }
    }
}

impl FileAgentConfig {
    /// Loop parameters described by this section.
    pub fn execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_turns(self.max_turns)
            .with_tool_timeout(self.tool_timeout_seconds.map(Duration::from_secs))
    }
}

/// Raw model configuration from TOML (`[model]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Model identifier reported by the gateway
    pub id: String,
    /// Reply script for the scripted model
    pub script: Option<PathBuf>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            id: "scripted".to_string(),
            script: None,
        }
    }
}

/// Raw telemetry configuration from TOML (`[telemetry]` section)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTelemetryConfig {
    /// JSONL file receiving span events
    pub trace_file: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Agent settings
    pub agent: FileAgentConfig,
    /// Model settings
    pub model: FileModelConfig,
    /// Telemetry settings
    pub telemetry: FileTelemetryConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.agent.name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyAgentName);
        }

        if self.agent.max_turns == 0 {
            return Err(ConfigValidationError::ZeroMaxTurns);
        }

        // A zero-second timeout would fail every tool call
        if let Some(0) = self.agent.tool_timeout_seconds {
            return Err(ConfigValidationError::InvalidToolTimeout);
        }

        if self.model.id.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelId);
        }

        Ok(())
    }
}
