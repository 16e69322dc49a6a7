//! Tool Registry
//!
//! The [`ToolRegistry`] maps tool names to their descriptors and handlers and
//! implements [`ToolExecutorPort`].
//!
//! # Usage
//!
//! ```ignore
//! use bridge_infrastructure::tools::{FunctionTool, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register("poem", "Write a poem", FunctionTool::new(write_poem))?;
//!
//! // Freeze: from here on the registry is only read.
//! let registry = Arc::new(registry);
//! assert!(registry.has_tool("poem"));
//! ```
//!
//! # Lifecycle
//!
//! Tools are registered while the registry is still exclusively owned. Once it
//! is moved into an `Arc` and handed to an agent, it is only accessed through
//! `&self` and needs no locking, so any number of responses can share it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bridge_application::ports::tool_executor::{CallContext, ToolExecutorPort};
use bridge_domain::{
    DomainError, OutputEncodeError, Schema, ToolCallRequest, ToolCallResult, ToolDescriptor,
    ToolError,
};

use super::handler::ToolHandler;
use super::invoker::ToolInvoker;

/// Name-keyed collection of tools.
#[derive(Default)]
pub struct ToolRegistry {
    /// Descriptors in registration order
    descriptors: Vec<ToolDescriptor>,
    /// Handlers, parallel to `descriptors`
    handlers: Vec<Arc<dyn ToolHandler>>,
    /// Tool name -> position
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool handler under `name`.
    ///
    /// Input and output schemas are inferred from the handler. On failure
    /// the registry is left unchanged.
    pub fn register<H: ToolHandler + 'static>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: H,
    ) -> Result<ToolDescriptor, DomainError> {
        self.register_arc(name, description, Arc::new(handler))
    }

    /// Register a tool handler (Arc version)
    pub fn register_arc(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<ToolDescriptor, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyToolName);
        }
        if self.index.contains_key(&name) {
            tracing::warn!(tool = %name, "Tool already registered");
            return Err(DomainError::DuplicateTool(name));
        }

        let infer = |document: serde_json::Value| {
            Schema::infer(&document).map_err(|source| DomainError::SchemaInference {
                tool: name.clone(),
                source,
            })
        };
        let input_schema = infer(handler.input_schema())?;
        let output_schema = infer(handler.output_schema())?;

        let descriptor =
            ToolDescriptor::new(name.clone(), description, input_schema, output_schema);
        tracing::debug!(
            tool = %name,
            inputs = descriptor.input_schema.len(),
            "Registered tool"
        );

        self.index.insert(name, self.descriptors.len());
        self.descriptors.push(descriptor.clone());
        self.handlers.push(handler);
        Ok(descriptor)
    }

    /// Find a tool by name.
    pub fn lookup(
        &self,
        name: &str,
    ) -> Result<(&ToolDescriptor, &Arc<dyn ToolHandler>), ToolError> {
        self.index
            .get(name)
            .map(|&i| (&self.descriptors[i], &self.handlers[i]))
            .ok_or_else(|| ToolError::unknown_tool(name))
    }

    /// All descriptors in registration order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn descriptors(&self) -> &[ToolDescriptor] {
        self.list()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn get_tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.lookup(name).ok().map(|(descriptor, _)| descriptor)
    }

    async fn execute(
        &self,
        request: &ToolCallRequest,
        ctx: &CallContext,
    ) -> Result<ToolCallResult, OutputEncodeError> {
        ToolInvoker::invoke(self, request, ctx).await
    }
}
