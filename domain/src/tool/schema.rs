//! Tool schemas: structural descriptions of tool inputs and outputs.
//!
//! A [`Schema`] is derived once per tool from a JSON Schema document (the
//! infrastructure layer produces that document from the handler's Rust types)
//! and is then used for two things:
//!
//! - **Advertising**: the model is told which fields a tool accepts.
//! - **Validation**: raw arguments coming back from the model are checked
//!   before they reach a handler, and handler output is checked before it is
//!   fed back to the model.
//!
//! ```text
//! JSON Schema document ──infer()──▶ Schema ──validate()──▶ Ok / SchemaViolation
//! ```
//!
//! Fields are kept in a [`BTreeMap`], so inferring the same document twice
//! always produces byte-identical serialized schemas.
//!
//! # Unknown fields
//!
//! Validation rejects fields that the schema does not declare, at every
//! nesting level. Free-form map fields (objects without declared properties)
//! accept any keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Maximum nesting (objects, arrays and `$ref` hops) accepted during inference.
pub const MAX_SCHEMA_DEPTH: usize = 32;

/// Primitive or container type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(FieldType::String),
            "integer" => Some(FieldType::Integer),
            "number" => Some(FieldType::Number),
            "boolean" => Some(FieldType::Boolean),
            "object" => Some(FieldType::Object),
            "array" => Some(FieldType::Array),
            _ => None,
        }
    }

    /// Whether a JSON value has this type. Integers must not carry a fraction.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Description of a single named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field must be present.
    pub required: bool,
    /// Whether an explicit `null` is accepted.
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared fields of an object. `None` for free-form maps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<Schema>,
    /// Element description of an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FieldSchema>>,
    /// Permitted values of a string enum. Empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FieldSchema {
    pub fn new(field_type: FieldType, required: bool) -> Self {
        Self {
            field_type,
            required,
            nullable: false,
            description: None,
            nested: None,
            items: None,
            allowed_values: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_nested(mut self, nested: Schema) -> Self {
        self.nested = Some(nested);
        self
    }

    pub fn with_items(mut self, items: FieldSchema) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn with_allowed_values(
        mut self,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn validate_value(&self, value: &Value, path: &str) -> Result<(), SchemaViolation> {
        if !self.field_type.matches(value) {
            return Err(SchemaViolation::TypeMismatch {
                path: path.to_string(),
                expected: self.field_type,
                found: json_kind(value),
            });
        }

        if !self.allowed_values.is_empty()
            && let Some(s) = value.as_str()
            && !self.allowed_values.iter().any(|allowed| allowed == s)
        {
            return Err(SchemaViolation::NotAllowed {
                path: path.to_string(),
                value: s.to_string(),
                allowed: self.allowed_values.clone(),
            });
        }

        match (self.field_type, value) {
            (FieldType::Object, _) => {
                if let Some(nested) = &self.nested {
                    nested.validate_at(value, path)?;
                }
            }
            (FieldType::Array, Value::Array(elements)) => {
                if let Some(items) = &self.items {
                    for (index, element) in elements.iter().enumerate() {
                        let element_path = format!("{}[{}]", path, index);
                        if element.is_null() && items.nullable {
                            continue;
                        }
                        items.validate_value(element, &element_path)?;
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }
}

/// Structural description of an object: field name → [`FieldSchema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: BTreeMap<String, FieldSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of required fields, in sorted order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, f)| f.required)
            .map(|(name, _)| name.as_str())
    }

    /// Derive a schema from a JSON Schema document.
    ///
    /// The document root must describe an object with a finite set of named
    /// properties. `$ref`s are resolved against the document's `$defs` (or
    /// `definitions`), `["T", "null"]` types and `anyOf: [T, null]` wrappers
    /// become nullable fields, and string enums keep their permitted values.
    pub fn infer(document: &Value) -> Result<Self, SchemaError> {
        Inferrer { root: document }.object_schema(document, "$", 0)
    }

    /// Check a JSON value against this schema.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), SchemaViolation> {
        let object = value.as_object().ok_or_else(|| SchemaViolation::NotAnObject {
            path: path.to_string(),
            found: json_kind(value),
        })?;

        for (name, field) in &self.fields {
            let field_path = format!("{}.{}", path, name);
            match object.get(name) {
                None => {
                    if field.required {
                        return Err(SchemaViolation::MissingField { path: field_path });
                    }
                }
                Some(Value::Null) => {
                    if !field.nullable {
                        return Err(SchemaViolation::TypeMismatch {
                            path: field_path,
                            expected: field.field_type,
                            found: "null",
                        });
                    }
                }
                Some(v) => field.validate_value(v, &field_path)?,
            }
        }

        if let Some(unknown) = object.keys().find(|k| !self.fields.contains_key(*k)) {
            return Err(SchemaViolation::UnknownField {
                path: format!("{}.{}", path, unknown),
            });
        }

        Ok(())
    }
}

/// Failure to derive a [`Schema`] from a JSON Schema document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("'{path}' must be an object with named fields, found {found}")]
    NotAnObject { path: String, found: String },

    #[error("'{path}' has no usable type")]
    MissingType { path: String },

    #[error("'{path}' uses unsupported type '{found}'")]
    UnsupportedType { path: String, found: String },

    #[error("'{path}' uses unsupported construct '{construct}'")]
    UnsupportedConstruct {
        path: String,
        construct: &'static str,
    },

    #[error("'{path}' references unknown definition '{reference}'")]
    UnresolvedReference { path: String, reference: String },

    #[error("'{path}' nests deeper than {} levels", MAX_SCHEMA_DEPTH)]
    TooDeep { path: String },
}

/// A JSON value that does not conform to a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("expected an object at '{path}', found {found}")]
    NotAnObject { path: String, found: &'static str },

    #[error("missing required field '{path}'")]
    MissingField { path: String },

    #[error("unknown field '{path}'")]
    UnknownField { path: String },

    #[error("expected {expected} at '{path}', found {found}")]
    TypeMismatch {
        path: String,
        expected: FieldType,
        found: &'static str,
    },

    #[error("value '{value}' at '{path}' is not one of [{}]", .allowed.join(", "))]
    NotAllowed {
        path: String,
        value: String,
        allowed: Vec<String>,
    },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

struct Classified<'a> {
    node: &'a Value,
    field_type: FieldType,
    nullable: bool,
    allowed_values: Vec<String>,
}

struct Inferrer<'a> {
    root: &'a Value,
}

impl<'a> Inferrer<'a> {
    fn resolve(&self, node: &'a Value, path: &str) -> Result<&'a Value, SchemaError> {
        let mut current = node;
        let mut hops = 0;
        while let Some(reference) = current.get("$ref").and_then(Value::as_str) {
            hops += 1;
            if hops > MAX_SCHEMA_DEPTH {
                return Err(SchemaError::TooDeep {
                    path: path.to_string(),
                });
            }
            current = reference
                .strip_prefix('#')
                .and_then(|pointer| self.root.pointer(pointer))
                .ok_or_else(|| SchemaError::UnresolvedReference {
                    path: path.to_string(),
                    reference: reference.to_string(),
                })?;
        }
        Ok(current)
    }

    fn classify(
        &self,
        node: &'a Value,
        path: &str,
        depth: usize,
    ) -> Result<Classified<'a>, SchemaError> {
        if depth > MAX_SCHEMA_DEPTH {
            return Err(SchemaError::TooDeep {
                path: path.to_string(),
            });
        }
        let node = self.resolve(node, path)?;

        for (key, construct) in [("anyOf", "anyOf"), ("oneOf", "oneOf")] {
            let Some(variants) = node.get(key).and_then(Value::as_array) else {
                continue;
            };

            let non_null: Vec<&Value> = variants.iter().filter(|v| !is_null_schema(v)).collect();
            if non_null.len() == 1 && non_null.len() < variants.len() {
                let mut inner = self.classify(non_null[0], path, depth + 1)?;
                inner.nullable = true;
                return Ok(inner);
            }

            if let Some(values) = string_alternatives(variants) {
                return Ok(Classified {
                    node,
                    field_type: FieldType::String,
                    nullable: false,
                    allowed_values: values,
                });
            }

            return Err(SchemaError::UnsupportedConstruct {
                path: path.to_string(),
                construct,
            });
        }

        if node.get("allOf").is_some() {
            return Err(SchemaError::UnsupportedConstruct {
                path: path.to_string(),
                construct: "allOf",
            });
        }

        let (field_type, nullable) = match node.get("type") {
            Some(Value::String(name)) => (parse_type(name, path)?, false),
            Some(Value::Array(names)) => {
                let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
                let nullable = names.contains(&"null");
                let concrete: Vec<&str> = names.into_iter().filter(|n| *n != "null").collect();
                match concrete.as_slice() {
                    [single] => (parse_type(single, path)?, nullable),
                    _ => {
                        return Err(SchemaError::UnsupportedType {
                            path: path.to_string(),
                            found: concrete.join("|"),
                        });
                    }
                }
            }
            Some(_) => {
                return Err(SchemaError::MissingType {
                    path: path.to_string(),
                });
            }
            None if node.get("properties").is_some() => (FieldType::Object, false),
            None if string_enum(node).is_some() => (FieldType::String, false),
            None => {
                return Err(SchemaError::MissingType {
                    path: path.to_string(),
                });
            }
        };

        let allowed_values = if field_type == FieldType::String {
            string_enum(node).unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(Classified {
            node,
            field_type,
            nullable,
            allowed_values,
        })
    }

    fn object_schema(
        &self,
        node: &'a Value,
        path: &str,
        depth: usize,
    ) -> Result<Schema, SchemaError> {
        let classified = self.classify(node, path, depth)?;
        if classified.field_type != FieldType::Object {
            return Err(SchemaError::NotAnObject {
                path: path.to_string(),
                found: classified.field_type.as_str().to_string(),
            });
        }
        let node = classified.node;

        let properties = node.get("properties").and_then(Value::as_object);
        if properties.is_none()
            && matches!(node.get("additionalProperties"), Some(Value::Object(_)))
        {
            return Err(SchemaError::NotAnObject {
                path: path.to_string(),
                found: "map".to_string(),
            });
        }

        let required: BTreeSet<&str> = node
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut fields = BTreeMap::new();
        for (name, property) in properties.into_iter().flatten() {
            let field_path = format!("{}.{}", path, name);
            let mut field = self.field_schema(property, &field_path, depth + 1)?;
            field.required = required.contains(name.as_str());
            fields.insert(name.clone(), field);
        }

        Ok(Schema { fields })
    }

    fn field_schema(
        &self,
        node: &'a Value,
        path: &str,
        depth: usize,
    ) -> Result<FieldSchema, SchemaError> {
        let own_description = node.get("description").and_then(Value::as_str);
        let classified = self.classify(node, path, depth)?;
        let description = own_description
            .or_else(|| classified.node.get("description").and_then(Value::as_str))
            .map(String::from);

        let mut field = FieldSchema::new(classified.field_type, true);
        field.nullable = classified.nullable;
        field.description = description;
        field.allowed_values = classified.allowed_values;

        match classified.field_type {
            FieldType::Object if classified.node.get("properties").is_some() => {
                field.nested = Some(self.object_schema(classified.node, path, depth + 1)?);
            }
            FieldType::Array => match classified.node.get("items") {
                Some(items @ Value::Object(_)) => {
                    let element_path = format!("{}[]", path);
                    let element = self.field_schema(items, &element_path, depth + 1)?;
                    field.items = Some(Box::new(element));
                }
                Some(Value::Array(_)) | Some(Value::Bool(false)) => {
                    return Err(SchemaError::UnsupportedConstruct {
                        path: path.to_string(),
                        construct: "tuple",
                    });
                }
                _ => {}
            },
            _ => {}
        }

        Ok(field)
    }
}

fn parse_type(name: &str, path: &str) -> Result<FieldType, SchemaError> {
    FieldType::parse(name).ok_or_else(|| SchemaError::UnsupportedType {
        path: path.to_string(),
        found: name.to_string(),
    })
}

fn is_null_schema(node: &Value) -> bool {
    node.get("type").and_then(Value::as_str) == Some("null")
}

fn string_enum(node: &Value) -> Option<Vec<String>> {
    if let Some(values) = node.get("enum").and_then(Value::as_array) {
        return values.iter().map(|v| v.as_str().map(String::from)).collect();
    }
    node.get("const").and_then(Value::as_str).map(|c| vec![c.to_string()])
}

/// `oneOf` of unit variants (each `{const: "x"}` or `{enum: [..]}`) collapses to a string enum.
fn string_alternatives(variants: &[Value]) -> Option<Vec<String>> {
    let mut values = Vec::new();
    for variant in variants {
        values.extend(string_enum(variant)?);
    }
    (!values.is_empty()).then_some(values)
}
