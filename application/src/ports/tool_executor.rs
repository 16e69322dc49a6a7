//! Tool Executor port
//!
//! Defines the interface for looking up and running registered tools.

use async_trait::async_trait;
use bridge_domain::{OutputEncodeError, ToolCallRequest, ToolCallResult, ToolDescriptor, ToolError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-call context handed to a tool handler.
///
/// Created by the dispatch loop for each tool call and dropped when the call
/// finishes. The cancellation token is a child of the response's token, so
/// cancelling the response also cancels every in-flight handler.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Name of the agent running the call
    pub agent_name: String,
    /// Id of the call being executed
    pub call_id: String,
    /// Upper bound on handler runtime, if any
    pub timeout: Option<Duration>,
    pub cancellation: CancellationToken,
}

impl CallContext {
    pub fn new(agent_name: impl Into<String>, call_id: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            call_id: call_id.into(),
            timeout: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Port for tool execution
///
/// This port defines how the application layer discovers and runs tools.
/// Implementations (adapters) live in the infrastructure layer and are shared
/// read-only across concurrent responses.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Descriptors of all available tools, in registration order
    fn descriptors(&self) -> &[ToolDescriptor];

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.get_tool(name).is_some()
    }

    /// Get the descriptor of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptors().iter().find(|d| d.name == name)
    }

    /// Get names of all available tools
    fn available_tools(&self) -> Vec<&str> {
        self.descriptors().iter().map(|d| d.name.as_str()).collect()
    }

    /// Execute a tool call.
    ///
    /// Recoverable failures (unknown tool, bad arguments, handler errors) are
    /// reported inside the returned [`ToolCallResult`]. Only output that
    /// violates the tool's own schema is returned as an error.
    async fn execute(
        &self,
        request: &ToolCallRequest,
        ctx: &CallContext,
    ) -> Result<ToolCallResult, OutputEncodeError>;
}

/// Executor with no tools; every call yields an unknown-tool result.
pub struct NoTools;

#[async_trait]
impl ToolExecutorPort for NoTools {
    fn descriptors(&self) -> &[ToolDescriptor] {
        &[]
    }

    async fn execute(
        &self,
        request: &ToolCallRequest,
        _ctx: &CallContext,
    ) -> Result<ToolCallResult, OutputEncodeError> {
        Ok(ToolCallResult::failure(
            request.call_id.clone(),
            request.tool_name.clone(),
            ToolError::unknown_tool(&request.tool_name),
        ))
    }
}
