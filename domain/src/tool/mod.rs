//! Tool domain module
//!
//! Pure definitions for exposing host functions to a model as callable tools.
//!
//! ```text
//! ┌────────────────┐    ┌─────────────────┐    ┌────────────────┐
//! │ ToolDescriptor │───▶│ ToolCallRequest │───▶│ ToolCallResult │
//! │ (advertised)   │    │ (from model)    │    │ (fed back)     │
//! └───────┬────────┘    └─────────────────┘    └────────────────┘
//!         │
//!         └─ input_schema / output_schema: Schema
//! ```
//!
//! # Key Types
//!
//! - [`Schema`]: structural description inferred from a JSON Schema document
//! - [`ToolDescriptor`]: name, description and schemas of a registered tool
//! - [`ToolCallRequest`]: raw invocation request coming from the model
//! - [`ToolCallResult`]: output or [`ToolError`] of one invocation
//! - [`OutputEncodeError`]: handler output does not match its own schema
//!
//! Registration, lookup and execution live in the infrastructure layer; the
//! application layer reaches them through the `ToolExecutorPort`.

pub mod entities;
pub mod schema;
pub mod value_objects;

pub use entities::{ToolCallRequest, ToolDescriptor};
pub use schema::{FieldSchema, FieldType, Schema, SchemaError, SchemaViolation};
pub use value_objects::{
    OutputEncodeError, ToolCallResult, ToolError, ToolErrorKind, ToolResultMetadata,
};
