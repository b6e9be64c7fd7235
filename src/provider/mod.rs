//! Language-model provider trait and the OpenAI implementation.

pub mod format;
pub mod http;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ReckonConfig;
use crate::error::ReckonError;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by model providers.
///
/// Implementations must be safe to share between concurrent sessions.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate one assistant reply for the given conversation.
    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, ReckonError>;
}

/// Create the configured provider.
pub fn create_provider(config: &ReckonConfig) -> Result<Arc<dyn ModelProvider>, ReckonError> {
    let api_key = config
        .api_key()
        .ok_or_else(|| ReckonError::Authentication("Missing OPENAI_API_KEY".into()))?;
    Ok(Arc::new(openai::OpenAiProvider::new(
        config.model().to_string(),
        api_key.to_string(),
        config.base_url().map(str::to_string),
    )))
}
