//! Conversation sessions keyed by an opaque context id.
//!
//! A session holds the message history the reasoning loop replays on every
//! model call, plus one [`ModelCallRecord`] per model invocation. Stores are
//! last-writer-wins: two turns racing on the same id both read the same
//! starting history and the later checkpoint replaces the earlier one.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReckonError;
use crate::types::{FinishReason, ModelMessage, Usage};

/// Ordered conversation state for one context id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub messages: Vec<ModelMessage>,
    #[serde(default)]
    pub model_calls: Vec<ModelCallRecord>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            model_calls: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Total token usage over every recorded model call.
    pub fn usage(&self) -> Usage {
        let mut total = Usage::default();
        for call in &self.model_calls {
            total.merge(&call.usage);
        }
        total
    }
}

/// One model invocation within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCallRecord {
    /// Step index within the turn that made the call, starting at 1.
    pub step: usize,
    pub finish_reason: Option<FinishReason>,
    pub usage: Usage,
    /// Names of the tools the model asked for, before parallel calls are dropped.
    #[serde(default)]
    pub requested_tools: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Storage for sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session, or `None` if the id has never been checkpointed.
    async fn get(&self, id: &str) -> Result<Option<Session>, ReckonError>;

    /// Replace the stored session with `session`.
    async fn put(&self, session: Session) -> Result<(), ReckonError>;

    /// Forget a session. Unknown ids are not an error.
    async fn evict(&self, id: &str) -> Result<(), ReckonError>;
}
