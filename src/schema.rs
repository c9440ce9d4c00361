//! Statically declared structural schemas for tool inputs and outputs.
//!
//! Each tool describes its argument and result shapes with a [`Schema`]
//! value built by hand. [`Schema::to_json`] renders the JSON Schema that is
//! sent to the model in the tool manifest.

use serde_json::{json, Map, Value};

/// A structural type descriptor.
// Built-in tools only declare strings and integers; the rest is kept for new tools.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String,
    Integer,
    Number,
    Boolean,
    /// A homogeneous list of the inner type.
    Array(Box<Schema>),
    /// An object with named, described fields.
    Object(Vec<Field>),
}

/// One named property of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub schema: Schema,
    pub required: bool,
}

impl Schema {
    /// Start an empty object schema.
    pub fn object() -> Self {
        Schema::Object(Vec::new())
    }

    /// Array whose items follow `items`.
    #[allow(dead_code)]
    pub fn array_of(items: Schema) -> Self {
        Schema::Array(Box::new(items))
    }

    /// Add a required, described field. No-op on non-object schemas.
    pub fn field(self, name: impl Into<String>, schema: Schema, description: &str) -> Self {
        self.push_field(Field {
            name: name.into(),
            description: Some(description.to_string()),
            schema,
            required: true,
        })
    }

    /// Add an optional, described field.
    pub fn optional_field(self, name: impl Into<String>, schema: Schema, description: &str) -> Self {
        self.push_field(Field {
            name: name.into(),
            description: Some(description.to_string()),
            schema,
            required: false,
        })
    }

    /// Add a required field without a description.
    #[allow(dead_code)]
    pub fn bare_field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.push_field(Field {
            name: name.into(),
            description: None,
            schema,
            required: true,
        })
    }

    fn push_field(self, field: Field) -> Self {
        match self {
            Schema::Object(mut fields) => {
                fields.push(field);
                Schema::Object(fields)
            }
            other => other,
        }
    }

    /// Names of the required fields, in declaration order.
    pub fn required_fields(&self) -> Vec<&str> {
        match self {
            Schema::Object(fields) => fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Check `value` against this schema.
    ///
    /// Unknown object keys are ignored; a missing or null required field and
    /// any primitive type mismatch are reported with the offending path.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        self.validate_at(value, "")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), String> {
        let matches = match (self, value) {
            (Schema::String, Value::String(_)) => true,
            (Schema::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Schema::Number, Value::Number(_)) => true,
            (Schema::Boolean, Value::Bool(_)) => true,
            (Schema::Array(items), Value::Array(values)) => {
                for (i, v) in values.iter().enumerate() {
                    items.validate_at(v, &format!("{path}[{i}]"))?;
                }
                true
            }
            (Schema::Object(fields), Value::Object(map)) => {
                for field in fields {
                    let child = if path.is_empty() {
                        field.name.clone()
                    } else {
                        format!("{path}.{}", field.name)
                    };
                    match map.get(&field.name) {
                        None | Some(Value::Null) if field.required => {
                            return Err(format!(
                                "missing required argument `{}` ({})",
                                child,
                                field.schema.type_name()
                            ));
                        }
                        None | Some(Value::Null) => {}
                        Some(v) => field.schema.validate_at(v, &child)?,
                    }
                }
                true
            }
            _ => false,
        };
        if matches {
            Ok(())
        } else {
            let at = if path.is_empty() { "arguments" } else { path };
            Err(format!(
                "`{}` must be of type {} but got {}",
                at,
                self.type_name(),
                json_type_name(value)
            ))
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Schema::String => "string",
            Schema::Integer => "integer",
            Schema::Number => "number",
            Schema::Boolean => "boolean",
            Schema::Array(_) => "array",
            Schema::Object(_) => "object",
        }
    }

    /// Render as a JSON Schema document.
    pub fn to_json(&self) -> Value {
        self.render(None)
    }

    fn render(&self, description: Option<&str>) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!(self.type_name()));
        if let Some(desc) = description {
            out.insert("description".into(), json!(desc));
        }
        match self {
            Schema::Array(items) => {
                out.insert("items".into(), items.render(None));
            }
            Schema::Object(fields) => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.name.clone(), f.schema.render(f.description.as_deref())))
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
                out.insert("required".into(), json!(self.required_fields()));
            }
            _ => {}
        }
        Value::Object(out)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_fields() {
        let schema = Schema::object()
            .field("s_str", Schema::String, "A string value.")
            .field("s_int", Schema::Integer, "An integer value.")
            .bare_field("s_bool", Schema::Boolean)
            .optional_field("s_double", Schema::Number, "A double.");

        assert_eq!(
            schema.to_json(),
            json!({
                "type": "object",
                "properties": {
                    "s_str": {"type": "string", "description": "A string value."},
                    "s_int": {"type": "integer", "description": "An integer value."},
                    "s_bool": {"type": "boolean"},
                    "s_double": {"type": "number", "description": "A double."}
                },
                "required": ["s_str", "s_int", "s_bool"]
            })
        );
    }

    #[test]
    fn test_nested_object_carries_field_description() {
        let item = Schema::object()
            .field("id", Schema::Integer, "Identifier for the nested item.")
            .field("value", Schema::String, "Value of the nested item.");
        let schema = Schema::object()
            .field("name", Schema::String, "Name of the main entity.")
            .field("item", item, "The nested item itself.")
            .field("tags", Schema::array_of(Schema::String), "A list of tags.");

        let rendered = schema.to_json();
        let item = &rendered["properties"]["item"];
        assert_eq!(item["type"], "object");
        assert_eq!(item["description"], "The nested item itself.");
        assert_eq!(item["properties"]["id"]["type"], "integer");
        assert_eq!(item["required"], json!(["id", "value"]));

        let tags = &rendered["properties"]["tags"];
        assert_eq!(tags["type"], "array");
        assert_eq!(tags["items"], json!({"type": "string"}));
        assert_eq!(tags["description"], "A list of tags.");
    }

    #[test]
    fn test_array_of_objects() {
        let entry = Schema::object().field("id", Schema::Integer, "ID of the list item");
        let schema = Schema::object().field(
            "items",
            Schema::array_of(entry),
            "A list of documented items",
        );
        let items = &schema.to_json()["properties"]["items"]["items"];
        assert_eq!(items["type"], "object");
        assert_eq!(items["properties"]["id"]["description"], "ID of the list item");
    }

    #[test]
    fn test_field_on_primitive_is_ignored() {
        let schema = Schema::String.field("x", Schema::Integer, "ignored");
        assert_eq!(schema, Schema::String);
        assert!(schema.required_fields().is_empty());
    }
    #[test]
    fn test_validate_ignores_unknown_keys() {
        let schema = Schema::object().field("path", Schema::String, "File path");
        assert!(schema
            .validate(&json!({"path": "a.txt", "extra": 1}))
            .is_ok());
    }

    #[test]
    fn test_validate_reports_missing_and_mismatched() {
        let schema = Schema::object()
            .field("command", Schema::String, "Command")
            .optional_field("timeout", Schema::Integer, "Seconds");

        let err = schema.validate(&json!({})).unwrap_err();
        assert!(err.contains("missing required argument `command`"));

        let err = schema
            .validate(&json!({"command": "ls", "timeout": "soon"}))
            .unwrap_err();
        assert!(err.contains("`timeout` must be of type integer but got string"));

        let err = schema.validate(&json!("ls")).unwrap_err();
        assert!(err.contains("`arguments` must be of type object"));

        assert!(schema
            .validate(&json!({"command": "ls", "timeout": null}))
            .is_ok());
    }

    #[test]
    fn test_validate_nested_paths() {
        let schema = Schema::object().field(
            "items",
            Schema::array_of(Schema::object().field("id", Schema::Integer, "ID")),
            "Items",
        );
        let err = schema
            .validate(&json!({"items": [{"id": 1}, {"id": "two"}]}))
            .unwrap_err();
        assert!(err.contains("`items[1].id`"));
    }
}
