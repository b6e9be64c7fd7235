//! JSON-RPC 2.0 envelope types and error codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReckonError;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const TASK_NOT_FOUND: i64 = -32001;
pub const TASK_NOT_CANCELABLE: i64 = -32002;

/// An incoming request. Fields are loose so envelope problems can be
/// reported as `-32600` rather than failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, detail)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, detail)
    }

    pub fn internal() -> Self {
        Self::new(INTERNAL_ERROR, "Internal error")
    }
}

impl From<&ReckonError> for JsonRpcError {
    /// Only caller-facing errors keep their message; everything else is
    /// reported as a generic internal error.
    fn from(err: &ReckonError) -> Self {
        match err {
            ReckonError::TaskNotFound(_) => Self::new(TASK_NOT_FOUND, "Task not found"),
            ReckonError::InvalidState(_) => Self::new(TASK_NOT_CANCELABLE, "Task cannot be canceled"),
            ReckonError::InvalidArgument(detail) => Self::invalid_params(detail.clone()),
            _ => Self::internal(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_causes_are_not_exposed() {
        let err = ReckonError::api(500, "upstream exploded: key sk-123");
        let rpc = JsonRpcError::from(&err);
        assert_eq!(rpc.code, INTERNAL_ERROR);
        assert_eq!(rpc.message, "Internal error");
    }

    #[test]
    fn task_errors_map_to_protocol_codes() {
        assert_eq!(JsonRpcError::from(&ReckonError::TaskNotFound("t".into())).code, TASK_NOT_FOUND);
        assert_eq!(JsonRpcError::from(&ReckonError::InvalidState("x".into())).code, TASK_NOT_CANCELABLE);
        assert_eq!(JsonRpcError::from(&ReckonError::InvalidArgument("no text".into())).code, INVALID_PARAMS);
    }
}
