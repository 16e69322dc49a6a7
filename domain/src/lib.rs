//! Domain layer for agent-bridge
//!
//! This crate contains the core types of the tool bridge: schemas, tool
//! descriptors, call requests and results, and conversation turns.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! A tool is a named, schema-described capability a model may ask to have run.
//! Its input and output shapes are described by a [`Schema`] inferred from the
//! handler's types, which is both advertised to the model and used to validate
//! what the model sends back.
//!
//! ## Conversation
//!
//! A [`Conversation`] is the append-only record of user input, model text,
//! tool requests and tool results that the dispatch loop builds up.

pub mod conversation;
pub mod core;
pub mod tool;

// Re-export commonly used types
pub use conversation::{Conversation, ConversationTurn, ModelReply};
pub use core::error::DomainError;
pub use tool::{
    entities::{ToolCallRequest, ToolDescriptor},
    schema::{FieldSchema, FieldType, MAX_SCHEMA_DEPTH, Schema, SchemaError, SchemaViolation},
    value_objects::{
        OutputEncodeError, ToolCallResult, ToolError, ToolErrorKind, ToolResultMetadata,
    },
};
