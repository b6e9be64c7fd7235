//! Tool parameter schemas.

use serde::{Deserialize, Serialize};

/// JSON Schema-based parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentToolParameters {
    /// JSON Schema object describing the parameters.
    pub schema: serde_json::Value,
}

impl AgentToolParameters {
    /// Create from a raw JSON Schema value.
    pub fn from_schema(schema: serde_json::Value) -> Self {
        Self { schema }
    }

    /// Builder: create an object schema with properties.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    /// Check call arguments against the top level of the schema.
    ///
    /// Verifies the object shape, required fields and the declared type of
    /// each known property. Returns the first violation found.
    pub fn validate(&self, args: &serde_json::Value) -> Result<(), String> {
        let Some(obj) = args.as_object() else {
            return Err(format!("expected object arguments, got {}", json_type_name(args)));
        };

        if let Some(required) = self.schema.get("required").and_then(|v| v.as_array()) {
            if let Some(missing) = required
                .iter()
                .filter_map(|field| field.as_str())
                .find(|name| !obj.contains_key(*name))
            {
                return Err(format!("missing required field '{missing}'"));
            }
        }

        let properties = self.schema.get("properties").and_then(|v| v.as_object());
        for (key, value) in obj {
            let expected = properties
                .and_then(|props| props.get(key))
                .and_then(|prop| prop.get("type"))
                .and_then(|t| t.as_str());
            if let Some(expected) = expected {
                if !value_matches_type(value, expected) {
                    return Err(format!(
                        "field '{key}' expected type '{expected}', got {}",
                        json_type_name(value)
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Builder for constructing tool parameter schemas.
pub struct ParameterBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    /// Add a string property.
    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name, "string", description, required)
    }

    /// Add an integer property.
    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name, "integer", description, required)
    }

    fn property(
        mut self,
        name: impl Into<String>,
        kind: &str,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            serde_json::json!({
                "type": kind,
                "description": description.into(),
            }),
        );
        if required {
            self.required.push(name);
        }
        self
    }

    /// Build into AgentToolParameters.
    pub fn build(self) -> AgentToolParameters {
        AgentToolParameters {
            schema: serde_json::json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}

fn value_matches_type(value: &serde_json::Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_params() -> AgentToolParameters {
        AgentToolParameters::object()
            .string("query", "Search query", true)
            .integer("num_results", "Result count", false)
            .build()
    }

    #[test]
    fn builder_marks_required_fields() {
        let params = search_params();
        assert_eq!(params.schema["type"], "object");
        assert_eq!(params.schema["properties"]["num_results"]["type"], "integer");
        assert_eq!(params.schema["required"], json!(["query"]));
    }

    #[test]
    fn validate_accepts_well_formed_arguments() {
        let params = search_params();
        assert!(params.validate(&json!({ "query": "leopard top speed" })).is_ok());
        assert!(params
            .validate(&json!({ "query": "bridge length", "num_results": 3, "extra": true }))
            .is_ok());
    }

    #[test]
    fn validate_reports_first_violation() {
        let params = search_params();
        assert_eq!(
            params.validate(&json!({})).unwrap_err(),
            "missing required field 'query'"
        );
        assert_eq!(
            params.validate(&json!({ "query": 7 })).unwrap_err(),
            "field 'query' expected type 'string', got number"
        );
        assert_eq!(
            params.validate(&json!("155 / 29")).unwrap_err(),
            "expected object arguments, got string"
        );
    }
}
