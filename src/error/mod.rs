//! Error types for Reckon.

use thiserror::Error;

/// Primary error type for all Reckon operations.
#[derive(Error, Debug)]
pub enum ReckonError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Step budget exhausted after {max_steps} model calls")]
    BudgetExhausted { max_steps: usize },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Search provider error: {0}")]
    Search(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Canceled")]
    Canceled,

    /// Opaque failure reported to callers. The cause is logged, never carried.
    #[error("Internal error")]
    Internal,
}

/// Broad error category for routing error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Budget,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    Canceled,
    Internal,
    Unknown,
}

impl ReckonError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) | Self::Search(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::BudgetExhausted { .. } => ErrorCategory::Budget,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            Self::Canceled => ErrorCategory::Canceled,
            Self::Internal => ErrorCategory::Internal,
            _ => ErrorCategory::Unknown,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ReckonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_maps_to_category() {
        assert_eq!(ReckonError::api(401, "nope").category(), ErrorCategory::Authentication);
        assert_eq!(ReckonError::api(429, "slow").category(), ErrorCategory::RateLimit);
        assert_eq!(ReckonError::api(503, "down").category(), ErrorCategory::Server);
        assert_eq!(ReckonError::api(400, "bad").category(), ErrorCategory::Api);
    }

    #[test]
    fn budget_exhaustion_is_its_own_kind() {
        let err = ReckonError::BudgetExhausted { max_steps: 4 };
        assert_eq!(err.category(), ErrorCategory::Budget);
        assert!(err.to_string().contains("4 model calls"));
    }

    #[test]
    fn internal_error_message_is_opaque() {
        assert_eq!(ReckonError::Internal.to_string(), "Internal error");
    }

    #[test]
    fn transport_failures_share_a_category() {
        assert_eq!(ReckonError::Search("reset".into()).category(), ErrorCategory::Network);
        assert_eq!(ReckonError::Timeout(100).category(), ErrorCategory::Timeout);
        assert_eq!(ReckonError::tool("calculator", "boom").category(), ErrorCategory::ToolExecution);
    }
}
