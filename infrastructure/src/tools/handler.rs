//! Tool handler abstraction
//!
//! A [`ToolHandler`] is the executable logic behind a tool. The registry
//! stores handlers as `Arc<dyn ToolHandler>` keyed by name, so every tool is
//! invoked through the same raw-JSON contract regardless of the concrete
//! input and output types behind it.

use async_trait::async_trait;
use bridge_application::ports::tool_executor::CallContext;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by a handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Arguments passed schema validation but could not be decoded
    #[error("Could not decode arguments: {0}")]
    Decode(String),

    /// The handler itself returned an error
    #[error("{0}")]
    Failed(String),

    /// The handler's output could not be serialized
    #[error("Could not encode output: {0}")]
    Encode(String),
}

/// Executable logic behind a registered tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// JSON Schema document describing the accepted arguments
    fn input_schema(&self) -> Value;

    /// JSON Schema document describing the produced output
    fn output_schema(&self) -> Value;

    /// Run the tool once with raw JSON arguments
    async fn call(&self, ctx: CallContext, arguments: Value) -> Result<Value, HandlerError>;
}
