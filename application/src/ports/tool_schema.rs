//! Tool schema conversion port.
//!
//! Separates "which tools exist" (the registry) from "how to describe them
//! to a model API" (infrastructure). Model adapters use this port to render
//! [`ToolDescriptor`]s in whatever function-calling format they speak.

use bridge_domain::ToolDescriptor;

/// Port for converting tool descriptors to a model's function-calling format.
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single tool descriptor to a function declaration.
    fn tool_to_declaration(&self, tool: &ToolDescriptor) -> serde_json::Value;

    /// Convert all tools to declarations, preserving their order.
    fn all_declarations(&self, tools: &[ToolDescriptor]) -> Vec<serde_json::Value> {
        tools.iter().map(|t| self.tool_to_declaration(t)).collect()
    }
}
