//! Agent wiring: provider, tools, sessions and the update stream.

use std::sync::Arc;

use async_stream::try_stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::agent_loop::{LoopStep, ReasoningLoop, RunLimits};
use crate::config::ReckonConfig;
use crate::error::ReckonError;
use crate::provider::{self, ModelProvider};
use crate::session::{FileSessionStore, InMemorySessionStore, SessionStore};
use crate::tools::{default_tools, DuckDuckGoSearch, SearchProvider};
use crate::types::GenerationSettings;

use super::update::{AgentUpdate, CALCULATING_TEXT, GATHERING_TEXT, NO_ANSWER_TEXT, PROCESSING_TEXT};

/// Content types accepted and produced by the agent.
pub const SUPPORTED_CONTENT_TYPES: &[&str] = &["text", "text/plain"];

/// Stream of updates for one turn.
pub type UpdateStream = BoxStream<'static, Result<AgentUpdate, ReckonError>>;

/// Answers quantitative questions with web search and a calculator.
#[derive(Clone)]
pub struct Agent {
    reasoning: ReasoningLoop,
}

impl Agent {
    pub fn new(reasoning: ReasoningLoop) -> Self {
        Self { reasoning }
    }

    /// Build the agent from configuration with the OpenAI provider and the
    /// DuckDuckGo search backend.
    pub fn from_config(config: &ReckonConfig) -> Result<Self, ReckonError> {
        let provider = provider::create_provider(config)?;
        let search: Arc<dyn SearchProvider> =
            Arc::new(DuckDuckGoSearch::new(Some(config.search_url().to_string())));
        Ok(Self::with_parts(config, provider, search))
    }

    /// Build the agent from configuration around explicit backends.
    pub fn with_parts(
        config: &ReckonConfig,
        provider: Arc<dyn ModelProvider>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        let sessions: Arc<dyn SessionStore> = match config.session_dir() {
            Some(dir) => Arc::new(FileSessionStore::new(dir)),
            None => Arc::new(InMemorySessionStore::new()),
        };
        let tools = default_tools(search, config.search_results());
        let reasoning = ReasoningLoop::new(provider, tools, sessions)
            .with_settings(
                GenerationSettings::builder()
                    .temperature(config.temperature())
                    .build(),
            )
            .with_limits(RunLimits::from(config));
        Self::new(reasoning)
    }

    pub fn reasoning(&self) -> &ReasoningLoop {
        &self.reasoning
    }

    /// Stream progress for `query` within the conversation `context_id`.
    ///
    /// The stream always opens with a processing notice and, unless the loop
    /// fails, ends with exactly one `done` update.
    pub fn stream(
        &self,
        query: impl Into<String>,
        context_id: impl Into<String>,
        cancel: CancellationToken,
    ) -> UpdateStream {
        let mut steps = self.reasoning.run(context_id, query, cancel);

        Box::pin(try_stream! {
            yield AgentUpdate::progress(PROCESSING_TEXT);

            let mut last: Option<LoopStep> = None;
            while let Some(step) = steps.next().await {
                let step = step?;
                if step.requests_tool() {
                    yield AgentUpdate::progress(GATHERING_TEXT);
                } else if matches!(step, LoopStep::Tool { .. }) {
                    yield AgentUpdate::progress(CALCULATING_TEXT);
                }
                last = Some(step);
            }

            yield AgentUpdate::done(final_answer(last.as_ref()));
        })
    }

    /// Run a turn to completion and return the answer text.
    pub async fn ask(
        &self,
        query: impl Into<String>,
        context_id: impl Into<String>,
    ) -> Result<String, ReckonError> {
        let mut updates = self.stream(query, context_id, CancellationToken::new());
        while let Some(update) = updates.next().await {
            let update = update?;
            if update.done {
                return Ok(update.text);
            }
        }
        Ok(NO_ANSWER_TEXT.to_string())
    }
}

fn final_answer(last: Option<&LoopStep>) -> String {
    last.filter(|step| step.is_final())
        .map(|step| step.message().text().trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_ANSWER_TEXT.to_string())
}
