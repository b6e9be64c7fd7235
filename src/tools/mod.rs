//! Tool system for function calling.

pub mod arguments;
pub mod calculator;
pub mod search;
pub mod tool;
pub mod types;

use std::sync::Arc;

pub use arguments::ToolArguments;
pub use calculator::calculator_tool;
pub use search::{search_tool, DuckDuckGoSearch, SearchProvider, SearchResult};
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::AgentToolParameters;

/// The agent's default tool belt: `calculator` and `search_web`.
pub fn default_tools(search: Arc<dyn SearchProvider>, max_results: usize) -> Vec<Arc<dyn Tool>> {
    vec![calculator_tool(), search_tool(search, max_results)]
}
