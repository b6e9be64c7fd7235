//! Per-request resource limits for the reasoning loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ReckonConfig;

/// Bounds applied to a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLimits {
    /// Model invocations allowed per turn.
    pub max_steps: usize,
    pub model_timeout: Duration,
    pub tool_timeout: Duration,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_steps: 10,
            model_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ReckonConfig> for RunLimits {
    fn from(config: &ReckonConfig) -> Self {
        Self {
            max_steps: config.max_steps(),
            model_timeout: config.model_timeout(),
            tool_timeout: config.tool_timeout(),
        }
    }
}
