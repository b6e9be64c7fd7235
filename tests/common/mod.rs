//! Shared test helpers: scripted model provider and canned search backends.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use reckon::agent::Agent;
use reckon::config::ReckonConfig;
use reckon::error::ReckonError;
use reckon::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use reckon::tools::{SearchProvider, SearchResult};
use reckon::types::{AgentToolCall, FinishReason, Usage};

enum Step {
    Reply(ProviderResponse),
    Fail(ReckonError),
}

/// A provider that replays queued responses in order and records requests.
///
/// Once the script runs out every call fails, so a loop that asks for more
/// model calls than a test planned shows up as an error.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ProviderRequest>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a plain text answer.
    pub fn text(self, text: &str) -> Self {
        self.push(Step::Reply(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        }))
    }

    /// Queue a reply requesting a single tool call.
    pub fn tool_call(self, id: &str, name: &str, args: Value) -> Self {
        self.tool_calls(vec![call(id, name, args)])
    }

    /// Queue a reply requesting several tool calls at once.
    pub fn tool_calls(self, calls: Vec<AgentToolCall>) -> Self {
        self.push(Step::Reply(ProviderResponse {
            text: String::new(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            },
            tool_calls: calls,
            finish_reason: Some(FinishReason::ToolCalls),
        }))
    }

    /// Queue a failing call.
    pub fn fail(self, err: ReckonError) -> Self {
        self.push(Step::Fail(err))
    }

    fn push(self, step: Step) -> Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, ReckonError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Step::Reply(response)) => Ok(response),
            Some(Step::Fail(err)) => Err(err),
            None => Err(ReckonError::api(500, "script exhausted")),
        }
    }
}

pub fn call(id: &str, name: &str, args: Value) -> AgentToolCall {
    AgentToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: args,
    }
}

/// Search backend answering every query with the same hits.
pub struct StaticSearch {
    results: Vec<SearchResult>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn pont_des_arts() -> Self {
        Self::new(vec![SearchResult {
            title: "Pont des Arts - Wikipedia".into(),
            snippet: "The Pont des Arts is 155 m long.".into(),
            link: "https://en.wikipedia.org/wiki/Pont_des_Arts".into(),
        }])
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, ReckonError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

/// Search backend whose transport always fails.
pub struct BrokenSearch;

#[async_trait]
impl SearchProvider for BrokenSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchResult>, ReckonError> {
        Err(ReckonError::Search("connection reset".into()))
    }
}

/// Search backend that answers only after `delay`.
pub struct SlowSearch {
    pub delay: Duration,
}

#[async_trait]
impl SearchProvider for SlowSearch {
    async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<SearchResult>, ReckonError> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![SearchResult {
            title: query.to_string(),
            snippet: "late".into(),
            link: String::new(),
        }])
    }
}

/// Agent over scripted backends with default configuration.
pub fn agent_with(provider: Arc<ScriptedProvider>, search: Arc<dyn SearchProvider>) -> Agent {
    agent_with_config(&ReckonConfig::default(), provider, search)
}

pub fn agent_with_config(
    config: &ReckonConfig,
    provider: Arc<ScriptedProvider>,
    search: Arc<dyn SearchProvider>,
) -> Agent {
    Agent::with_parts(config, provider, search)
}
