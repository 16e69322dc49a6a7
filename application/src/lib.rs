//! Application layer for agent-bridge
//!
//! This crate contains the agent configuration, the dispatch loop use case
//! and the port definitions it depends on. It depends only on the domain layer.

pub mod agent;
pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use agent::{Agent, AgentConfig, AgentConfigBuilder, Response};
pub use config::{DEFAULT_MAX_TURNS, ExecutionParams};
pub use ports::{
    model_gateway::{GatewayError, ModelGateway, ModelRequest},
    observability::{NoObservability, ObservabilitySink, SpanEnd, SpanKind, SpanStart, SpanStatus},
    tool_executor::{CallContext, NoTools, ToolExecutorPort},
    tool_schema::ToolSchemaPort,
};
pub use use_cases::dispatch::RespondError;
