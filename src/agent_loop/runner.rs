//! The reasoning loop runner.

use std::sync::Arc;

use async_stream::try_stream;
use chrono::Utc;
use futures::stream::BoxStream;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ReckonError;
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::session::{ModelCallRecord, Session, SessionStore};
use crate::tools::{Tool, ToolArguments, ToolExecutionContext};
use crate::types::{AgentToolCall, GenerationSettings, ModelMessage};
use crate::util::with_timeout;

use super::events::LoopStep;
use super::types::RunLimits;

/// Instruction prepended to every model call.
pub const SYSTEM_INSTRUCTION: &str = "You are a precise assistant that answers questions by using tools when needed. \
1. If you lack factual data (e.g., speeds, distances, sizes), use the 'search_web' tool to retrieve it. \
2. Once you have all necessary numbers, use the 'calculator' tool to compute the result. \
3. Your final output MUST include: \
   - The final answer, \
   - The key values and facts used (e.g., 'leopard speed: 29 m/s', 'bridge length: 155 m'), \
   - The calculation performed (e.g., '155 / 29 = 5.34'). \
Do NOT include apologies, extra commentary, or unrelated text. \
All calculations must use meters and seconds; convert units if necessary.";

/// Stream of loop steps for one turn.
pub type StepStream = BoxStream<'static, Result<LoopStep, ReckonError>>;

/// Drives the assistant ⇄ tools state machine for a session.
///
/// Cheap to clone; one instance is shared by every concurrent session.
#[derive(Clone)]
pub struct ReasoningLoop {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<Vec<Arc<dyn Tool>>>,
    sessions: Arc<dyn SessionStore>,
    settings: GenerationSettings,
    limits: RunLimits,
}

impl ReasoningLoop {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        tools: Vec<Arc<dyn Tool>>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            provider,
            tools: Arc::new(tools),
            sessions,
            settings: GenerationSettings::builder()
                .temperature(0.0)
                .parallel_tool_calls(false)
                .build(),
            limits: RunLimits::default(),
        }
    }

    /// Replace the generation settings. Parallel tool calls stay disabled.
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = GenerationSettings {
            parallel_tool_calls: Some(false),
            ..settings
        };
        self
    }

    pub fn with_limits(mut self, limits: RunLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> RunLimits {
        self.limits
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Run one turn: append `query` to the session and step until the model
    /// answers without a tool request.
    ///
    /// The session is checkpointed after every step. `cancel` is observed
    /// between steps only; an in-flight model or tool call runs to completion
    /// or to its timeout.
    pub fn run(
        &self,
        session_id: impl Into<String>,
        query: impl Into<String>,
        cancel: CancellationToken,
    ) -> StepStream {
        let this = self.clone();
        let session_id = session_id.into();
        let query = query.into();

        Box::pin(try_stream! {
            let mut session = this
                .sessions
                .get(&session_id)
                .await?
                .unwrap_or_else(|| Session::new(session_id.clone()));
            session.messages.push(ModelMessage::user(query));

            let mut step = 0usize;
            loop {
                if cancel.is_cancelled() {
                    Err::<(), _>(ReckonError::Canceled)?;
                }
                if step >= this.limits.max_steps {
                    warn!(session = %session_id, max_steps = this.limits.max_steps, "step budget exhausted");
                    Err::<(), _>(ReckonError::BudgetExhausted { max_steps: this.limits.max_steps })?;
                }
                step += 1;

                let request = this.provider_request(&session.messages);
                let response = with_timeout(
                    this.limits.model_timeout,
                    this.provider.generate_text(&request),
                )
                .await?;

                let requested_tools: Vec<String> =
                    response.tool_calls.iter().map(|c| c.name.clone()).collect();
                debug!(
                    session = %session_id,
                    step,
                    tool_calls = requested_tools.len(),
                    finish_reason = ?response.finish_reason,
                    "model step complete"
                );
                session.model_calls.push(ModelCallRecord {
                    step,
                    finish_reason: response.finish_reason,
                    usage: response.usage,
                    requested_tools,
                    timestamp: Utc::now(),
                });

                let call = first_call(response.tool_calls);
                let message = match call {
                    Some(ref call) => ModelMessage::assistant_with_tool_calls(response.text, vec![call.clone()]),
                    None => ModelMessage::assistant(response.text),
                };
                session.messages.push(message.clone());
                this.checkpoint(&mut session).await?;
                yield LoopStep::Assistant { step, message };

                let Some(call) = call else {
                    break;
                };

                let outcome = if cancel.is_cancelled() {
                    Err(ReckonError::Canceled)
                } else {
                    this.execute_tool(&session_id, &call).await
                };
                if let Err(ref err) = outcome {
                    // Every tool call keeps an answer in the history, even
                    // when the turn is abandoned.
                    session.messages.push(error_result(&call, err.to_string()));
                    this.checkpoint(&mut session).await?;
                }
                let message = outcome?;
                session.messages.push(message.clone());
                this.checkpoint(&mut session).await?;
                yield LoopStep::Tool { step, message };
            }
        })
    }

    fn provider_request(&self, history: &[ModelMessage]) -> ProviderRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ModelMessage::system(SYSTEM_INSTRUCTION));
        messages.extend(history.iter().cloned());

        let tools = if self.tools.is_empty() {
            None
        } else {
            Some(
                self.tools
                    .iter()
                    .map(|t| ToolDefinition {
                        name: t.name().to_string(),
                        description: t.description().to_string(),
                        parameters: t.parameters().schema.clone(),
                    })
                    .collect(),
            )
        };

        ProviderRequest {
            messages,
            settings: self.settings.clone(),
            tools,
        }
    }

    /// Run the requested tool and wrap its output as a tool message.
    ///
    /// Unknown tools, schema violations and invalid arguments become error
    /// results for the model. Transport failures and timeouts end the turn.
    async fn execute_tool(
        &self,
        session_id: &str,
        call: &AgentToolCall,
    ) -> Result<ModelMessage, ReckonError> {
        let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) else {
            warn!(tool = %call.name, "model requested unknown tool");
            return Ok(error_result(call, format!("Tool '{}' not found", call.name)));
        };

        let args = ToolArguments::new(call.arguments.clone());
        if let Err(reason) = tool.parameters().validate(args.raw()) {
            warn!(tool = %call.name, %reason, "tool arguments rejected");
            return Ok(error_result(call, format!("Invalid arguments for '{}': {reason}", call.name)));
        }

        let ctx = ToolExecutionContext {
            tool_call_id: Some(call.id.clone()),
            session_id: Some(session_id.to_string()),
        };
        match with_timeout(self.limits.tool_timeout, tool.execute(&args, &ctx)).await {
            Ok(value) => Ok(ModelMessage::tool_result(call.id.clone(), value, false)),
            Err(err @ (ReckonError::InvalidArgument(_) | ReckonError::ToolExecution { .. })) => {
                warn!(tool = %call.name, error = %err, "tool reported invalid input");
                Ok(error_result(call, err.to_string()))
            }
            Err(err) => {
                warn!(tool = %call.name, error = %err, "tool failed");
                Err(err)
            }
        }
    }

    async fn checkpoint(&self, session: &mut Session) -> Result<(), ReckonError> {
        session.updated_at = Utc::now();
        self.sessions.put(session.clone()).await
    }
}

/// Keep only the first requested call.
fn first_call(calls: Vec<AgentToolCall>) -> Option<AgentToolCall> {
    if calls.len() > 1 {
        warn!(
            dropped = calls.len() - 1,
            "model issued parallel tool calls; honoring the first"
        );
    }
    calls.into_iter().next()
}

fn error_result(call: &AgentToolCall, message: String) -> ModelMessage {
    ModelMessage::tool_result(call.id.clone(), json!({ "error": message }), true)
}
