//! Output schemas for structured generation.
//!
//! A [`SchemaSpec`] pairs a name with a JSON schema that both providers
//! accept: OpenAI as a `json_schema` response format, Anthropic as the
//! `input_schema` of a forced tool. Schemas are derived from Rust types
//! with `schemars` and then normalized:
//!
//! 1. every object gets `additionalProperties: false`
//! 2. every property is listed in `required`
//! 3. `$ref`s are inlined and `definitions`/`$schema` removed
//!
//! ```rust,ignore
//! #[derive(Deserialize, JsonSchema)]
//! struct Details { codename: String, punchline: String }
//!
//! let spec = SchemaSpec::of::<Details>("details");
//! let value: Details = client.extract(&spec, prompt).await?;
//! ```

use schemars::{schema_for, JsonSchema};
use serde_json::{Map, Value};

/// A named JSON schema sent to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSpec {
    /// Identifier (tool name for Anthropic, schema name for OpenAI)
    pub name: String,

    /// Normalized JSON schema
    pub schema: Value,
}

impl SchemaSpec {
    /// Build a spec from an already-normalized schema value.
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Derive a spec from a Rust type.
    pub fn of<T: JsonSchema>(name: impl Into<String>) -> Self {
        let root = schema_for!(T);
        let mut value = serde_json::to_value(root).unwrap_or_default();

        let definitions = value.get("definitions").cloned();
        if let Some(defs) = definitions {
            inline_refs(&mut value, &defs);
        }
        close_objects(&mut value);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
            map.remove("title");
        }

        Self::new(name, value)
    }

    /// Restrict a top-level property to a fixed set of string values.
    ///
    /// For a string property the `enum` lands on the property itself; for
    /// an array of strings it lands on `items`. Unknown properties are left
    /// untouched.
    pub fn restrict_enum<I, S>(mut self, property: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<Value> = values.into_iter().map(|v| Value::String(v.into())).collect();

        if let Some(prop) = self
            .schema
            .get_mut("properties")
            .and_then(|p| p.get_mut(property))
        {
            let target = if is_array_schema(prop) {
                prop.get_mut("items")
            } else {
                Some(prop)
            };

            if let Some(Value::Object(target)) = target {
                target.insert("enum".to_string(), Value::Array(values));
            }
        }

        self
    }

    /// Names of the top-level properties, in schema order.
    pub fn property_names(&self) -> Vec<&str> {
        self.schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

fn is_array_schema(value: &Value) -> bool {
    match value.get("type") {
        Some(Value::String(t)) => t == "array",
        Some(Value::Array(types)) => types.iter().any(|t| t == "array"),
        _ => false,
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(t)) => t == "object",
        Some(Value::Array(types)) => types.iter().any(|t| t == "object"),
        _ => false,
    }
}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if is_object_schema(map) {
                map.insert("additionalProperties".to_string(), Value::Bool(false));

                let keys: Option<Vec<Value>> = map
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| props.keys().cloned().map(Value::String).collect());
                if let Some(keys) = keys {
                    map.insert("required".to_string(), Value::Array(keys));
                }
            }

            for (_, child) in map.iter_mut() {
                close_objects(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(mut def) = target {
                inline_refs(&mut def, definitions);
                *value = def;
                return;
            }

            for (_, child) in map.iter_mut() {
                inline_refs(child, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}
