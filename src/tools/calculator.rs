//! `calculator` tool.

use std::sync::Arc;

use crate::arith;

use super::tool::{AgentTool, Tool, ToolExecutionContext};
use super::types::AgentToolParameters;

pub const CALCULATOR_TOOL_NAME: &str = "calculator";

const DESCRIPTION: &str = "Evaluates a mathematical expression and returns the result as a string. \
The expression may contain numbers, parentheses and the operators +, -, *, /, //, %, ** \
(e.g. \"155 / 29\", \"(10 + 5) * 2\").";

/// Create the `calculator` tool.
///
/// Invalid or failing expressions are not tool failures: the model receives
/// an `Error: ...` string and can correct itself.
pub fn calculator_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        CALCULATOR_TOOL_NAME,
        DESCRIPTION,
        AgentToolParameters::object()
            .string(
                "expression",
                "A string containing a valid arithmetic expression",
                true,
            )
            .build(),
        |args, _ctx: ToolExecutionContext| async move {
            let expression = args.get_str("expression")?;
            let output = arith::calculate(expression);
            tracing::debug!(expression, output = %output, "calculator evaluated");
            Ok(serde_json::Value::String(output))
        },
    ))
}
