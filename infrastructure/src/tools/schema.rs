//! Function declaration converter.
//!
//! Default implementation of [`ToolSchemaPort`] that renders tool descriptors
//! as function-calling declarations:
//!
//! ```json
//! {
//!   "name": "poem",
//!   "description": "Write a poem",
//!   "parameters": {
//!     "type": "object",
//!     "properties": { "line_count": { "type": "integer" } },
//!     "required": ["line_count"]
//!   }
//! }
//! ```
//!
//! Nullable fields carry `"nullable": true`; string enums carry `"enum"`.

use bridge_application::ports::tool_schema::ToolSchemaPort;
use bridge_domain::{FieldSchema, Schema, ToolDescriptor};
use serde_json::{Map, Value, json};

pub struct FunctionDeclarationConverter;

impl FunctionDeclarationConverter {
    /// Render a domain schema as a JSON Schema object.
    pub fn object_schema(schema: &Schema) -> Value {
        let properties: Map<String, Value> = schema
            .fields
            .iter()
            .map(|(name, field)| (name.clone(), Self::field_schema(field)))
            .collect();
        let required: Vec<&str> = schema.required_fields().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    fn field_schema(field: &FieldSchema) -> Value {
        let mut rendered = match &field.nested {
            Some(nested) => Self::object_schema(nested),
            None => json!({ "type": field.field_type.as_str() }),
        };

        if let Value::Object(map) = &mut rendered {
            if let Some(description) = &field.description {
                map.insert("description".to_string(), json!(description));
            }
            if field.nullable {
                map.insert("nullable".to_string(), json!(true));
            }
            if !field.allowed_values.is_empty() {
                map.insert("enum".to_string(), json!(field.allowed_values));
            }
            if let Some(items) = &field.items {
                map.insert("items".to_string(), Self::field_schema(items));
            }
        }
        rendered
    }
}

impl ToolSchemaPort for FunctionDeclarationConverter {
    fn tool_to_declaration(&self, tool: &ToolDescriptor) -> Value {
        json!({
            "name": tool.name,
            "description": tool.description,
            "parameters": Self::object_schema(&tool.input_schema),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_domain::FieldType;

    fn poem_descriptor() -> ToolDescriptor {
        let input = Schema::new()
            .with_field(
                "line_count",
                FieldSchema::new(FieldType::Integer, true).with_description("Number of lines"),
            )
            .with_field(
                "style",
                FieldSchema::new(FieldType::String, false)
                    .nullable()
                    .with_allowed_values(["haiku", "sonnet"]),
            );
        let output = Schema::new().with_field("poem", FieldSchema::new(FieldType::String, true));
        ToolDescriptor::new("poem", "Write a poem", input, output)
    }

    #[test]
    fn test_tool_to_declaration() {
        let converter = FunctionDeclarationConverter;
        let declaration = converter.tool_to_declaration(&poem_descriptor());

        assert_eq!(declaration["name"], "poem");
        assert_eq!(declaration["description"], "Write a poem");

        let parameters = &declaration["parameters"];
        assert_eq!(parameters["type"], "object");
        assert_eq!(parameters["required"], json!(["line_count"]));
        assert_eq!(
            parameters["properties"]["line_count"],
            json!({ "type": "integer", "description": "Number of lines" })
        );
        assert_eq!(
            parameters["properties"]["style"],
            json!({ "type": "string", "nullable": true, "enum": ["haiku", "sonnet"] })
        );
    }

    #[test]
    fn test_nested_and_array_fields() {
        let item = Schema::new().with_field("sku", FieldSchema::new(FieldType::String, true));
        let input = Schema::new().with_field(
            "items",
            FieldSchema::new(FieldType::Array, true)
                .with_items(FieldSchema::new(FieldType::Object, true).with_nested(item)),
        );
        let descriptor = ToolDescriptor::new("order", "Place an order", input, Schema::new());

        let declaration = FunctionDeclarationConverter.tool_to_declaration(&descriptor);

        let items = &declaration["parameters"]["properties"]["items"];
        assert_eq!(items["type"], "array");
        assert_eq!(items["items"]["type"], "object");
        assert_eq!(items["items"]["required"], json!(["sku"]));
    }

    #[test]
    fn test_all_declarations_keeps_order() {
        let mut second = poem_descriptor();
        second.name = "attack".to_string();
        let declarations =
            FunctionDeclarationConverter.all_declarations(&[poem_descriptor(), second]);

        let names: Vec<&str> = declarations.iter().filter_map(|d| d["name"].as_str()).collect();
        assert_eq!(names, vec!["poem", "attack"]);
    }
}
