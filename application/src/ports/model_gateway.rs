//! Model Gateway port
//!
//! Defines the interface for asking a language model for its next reply.

use async_trait::async_trait;
use bridge_domain::{Conversation, ModelReply, ToolDescriptor};
use thiserror::Error;

/// Errors that can occur during model gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid reply: {0}")]
    InvalidReply(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Everything the model sees for one call.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    /// System instruction of the agent
    pub instruction: &'a str,
    /// Full conversation so far, ending with the newest turn
    pub history: &'a Conversation,
    /// Tools the model may request
    pub tools: &'a [ToolDescriptor],
}

impl<'a> ModelRequest<'a> {
    pub fn new(
        instruction: &'a str,
        history: &'a Conversation,
        tools: &'a [ToolDescriptor],
    ) -> Self {
        Self {
            instruction,
            history,
            tools,
        }
    }
}

/// Gateway for model communication
///
/// This port defines how the dispatch loop talks to a language model.
/// Implementations (adapters) live in the infrastructure layer. The gateway
/// is shared across concurrent `respond` calls, so implementations must be
/// safe to call from several tasks at once.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Identifier of the underlying model (e.g., "gemini-2.5-flash")
    fn model_id(&self) -> &str;

    /// Send the conversation and get the model's next reply
    async fn send(&self, request: ModelRequest<'_>) -> Result<ModelReply, GatewayError>;
}
