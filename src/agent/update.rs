//! Caller-visible progress notifications.

use serde::{Deserialize, Serialize};

pub const PROCESSING_TEXT: &str = "Processing your request...";
pub const GATHERING_TEXT: &str = "Gathering information...";
pub const CALCULATING_TEXT: &str = "Performing calculation...";
pub const NO_ANSWER_TEXT: &str = "No answer generated.";

/// One notification in an agent turn.
///
/// A turn produces any number of progress updates followed by exactly one
/// update with `done` set, carrying the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentUpdate {
    pub done: bool,
    pub needs_input: bool,
    pub text: String,
}

impl AgentUpdate {
    pub fn progress(text: impl Into<String>) -> Self {
        Self {
            done: false,
            needs_input: false,
            text: text.into(),
        }
    }

    pub fn done(text: impl Into<String>) -> Self {
        Self {
            done: true,
            needs_input: false,
            text: text.into(),
        }
    }
}
