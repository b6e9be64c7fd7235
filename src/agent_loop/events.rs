//! Step events emitted by the reasoning loop.

use serde::{Deserialize, Serialize};

use crate::types::ModelMessage;

/// One completed state of the loop.
///
/// Each variant carries the message the step appended to the session.
/// `step` is the index of the model call the step belongs to, starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoopStep {
    /// The model replied, with or without a tool request.
    Assistant { step: usize, message: ModelMessage },
    /// A requested tool ran and its result was recorded.
    Tool { step: usize, message: ModelMessage },
}

impl LoopStep {
    pub fn message(&self) -> &ModelMessage {
        match self {
            Self::Assistant { message, .. } | Self::Tool { message, .. } => message,
        }
    }

    pub fn step(&self) -> usize {
        match self {
            Self::Assistant { step, .. } | Self::Tool { step, .. } => *step,
        }
    }

    /// An assistant reply that asks for a tool.
    pub fn requests_tool(&self) -> bool {
        matches!(self, Self::Assistant { message, .. } if message.requests_tools())
    }

    /// The terminal step: an assistant reply with no tool request.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Assistant { message, .. } if !message.requests_tools())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentToolCall;
    use serde_json::json;

    #[test]
    fn classification() {
        let call = AgentToolCall {
            id: "c1".into(),
            name: "calculator".into(),
            arguments: json!({ "expression": "1+1" }),
        };
        let asking = LoopStep::Assistant {
            step: 1,
            message: ModelMessage::assistant_with_tool_calls("", vec![call]),
        };
        assert!(asking.requests_tool());
        assert!(!asking.is_final());

        let tool = LoopStep::Tool {
            step: 1,
            message: ModelMessage::tool_result("c1", json!("2"), false),
        };
        assert!(!tool.requests_tool());
        assert!(!tool.is_final());

        let answer = LoopStep::Assistant {
            step: 2,
            message: ModelMessage::assistant("2"),
        };
        assert!(answer.is_final());
        assert_eq!(answer.step(), 2);
    }
}
