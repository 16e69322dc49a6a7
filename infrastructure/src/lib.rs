//! Infrastructure layer for agent-bridge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the tool registry and invoker, a scripted
//! model gateway, span sinks, and configuration file loading.

pub mod config;
pub mod logging;
pub mod model;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig, FileModelConfig,
    FileTelemetryConfig,
};
pub use logging::{JsonlSpanSink, TracingSpanSink};
pub use model::{ScriptError, ScriptedModel};
pub use tools::{
    FunctionDeclarationConverter, FunctionTool, HandlerError, ToolHandler, ToolInvoker,
    ToolRegistry,
};
