//! Domain error types

use crate::tool::schema::SchemaError;
use thiserror::Error;

/// Construction-time errors.
///
/// Raised while registering tools or building an agent, before any
/// conversation starts. None of these are recoverable by the dispatch loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Tool name must not be empty")]
    EmptyToolName,

    #[error("Schema inference failed for tool '{tool}': {source}")]
    SchemaInference {
        tool: String,
        #[source]
        source: SchemaError,
    },

    #[error("Invalid agent configuration: {0}")]
    InvalidAgentConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_tool_display() {
        let error = DomainError::DuplicateTool("poem".to_string());
        assert_eq!(error.to_string(), "Tool 'poem' is already registered");
    }

    #[test]
    fn test_schema_inference_display() {
        let error = DomainError::SchemaInference {
            tool: "echo".to_string(),
            source: SchemaError::NotAnObject {
                path: "$".to_string(),
                found: "string".to_string(),
            },
        };
        let message = error.to_string();
        assert!(message.contains("echo"));
        assert!(message.contains("must be an object"));
    }
}
