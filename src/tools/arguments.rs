//! Typed access to tool call arguments.

use crate::error::ReckonError;

/// Wrapper around tool call arguments providing typed extraction.
///
/// Providers sometimes hand arguments over as a JSON-encoded string; those
/// are decoded on construction so accessors always see the object form.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        let value = match value {
            serde_json::Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(trimmed).unwrap_or(serde_json::Value::String(raw))
                }
            }
            other => other,
        };
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, ReckonError> {
        self.get_str_opt(key)
            .ok_or_else(|| ReckonError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an optional non-negative integer argument.
    pub fn get_u64_opt(&self, key: &str) -> Option<u64> {
        self.value.get(key).and_then(|v| v.as_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_string_encoded_objects() {
        let args = ToolArguments::new(json!("{\"expression\": \"2 + 2\"}"));
        assert_eq!(args.get_str("expression").unwrap(), "2 + 2");
    }

    #[test]
    fn blank_string_becomes_empty_object() {
        let args = ToolArguments::new(json!("   "));
        assert_eq!(args.raw(), &json!({}));
    }

    #[test]
    fn undecodable_string_is_kept_verbatim() {
        let args = ToolArguments::new(json!("not json"));
        assert_eq!(args.raw(), &json!("not json"));
        assert!(args.get_str("expression").is_err());
    }

    #[test]
    fn integer_accessor_ignores_negatives_and_strings() {
        let args = ToolArguments::new(json!({ "a": 3, "b": -1, "c": "3" }));
        assert_eq!(args.get_u64_opt("a"), Some(3));
        assert_eq!(args.get_u64_opt("b"), None);
        assert_eq!(args.get_u64_opt("c"), None);
    }
}
