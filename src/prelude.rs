//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentUpdate};
pub use crate::agent_loop::{LoopStep, ReasoningLoop, RunLimits};
pub use crate::config::ReckonConfig;
pub use crate::error::{ReckonError, Result};
pub use crate::executor::TaskExecutor;
pub use crate::provider::ModelProvider;
pub use crate::session::{InMemorySessionStore, SessionStore};
pub use crate::task::{InMemoryTaskStore, Task, TaskState, TaskStore};
pub use crate::tools::{AgentTool, AgentToolParameters, SearchProvider, Tool, ToolArguments};
pub use crate::types::{ContentPart, GenerationSettings, ModelMessage, Role, Usage};
