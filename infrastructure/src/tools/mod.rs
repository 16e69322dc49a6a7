//! Tool infrastructure
//!
//! Adapters that make typed Rust functions available to a model:
//!
//! - [`FunctionTool`]: wraps `Fn(CallContext, I) -> Future<Result<O, E>>` as a [`ToolHandler`]
//! - [`ToolRegistry`]: name-keyed handlers, implements `ToolExecutorPort`
//! - [`ToolInvoker`]: validates arguments, runs the handler, checks its output
//! - [`FunctionDeclarationConverter`]: renders descriptors for function calling

pub mod function;
pub mod handler;
pub mod invoker;
pub mod registry;
pub mod schema;

pub use function::FunctionTool;
pub use handler::{HandlerError, ToolHandler};
pub use invoker::ToolInvoker;
pub use registry::ToolRegistry;
pub use schema::FunctionDeclarationConverter;
