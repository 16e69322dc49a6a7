//! Port definitions for the application layer.
//!
//! Ports are the seams between the dispatch loop and the outside world.
//! Adapters implementing them live in the infrastructure layer.

pub mod model_gateway;
pub mod observability;
pub mod tool_executor;
pub mod tool_schema;
