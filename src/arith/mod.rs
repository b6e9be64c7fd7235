//! Restricted arithmetic evaluation.
//!
//! Expressions are tokenized, parsed into an AST by a recursive-descent
//! parser and evaluated directly. Only numbers, parentheses and the operators
//! `+ - * / // % **` exist in the grammar; there is no notion of names,
//! attributes or calls, so nothing outside plain arithmetic can be expressed.
//!
//! ```
//! use reckon::arith::evaluate;
//!
//! assert_eq!(evaluate("155 / 29").unwrap().to_string(), "5.344827586206897");
//! assert_eq!(evaluate("(10 + 5) * 2").unwrap().to_string(), "30");
//! ```

mod lexer;
mod number;
mod parser;

pub use number::Number;
pub use parser::{BinaryOp, Expr, UnaryOp};

use thiserror::Error;

/// Longest expression accepted, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 4096;

/// Deepest parenthesis/unary nesting accepted by the parser.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Reasons an expression cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithError {
    #[error("Invalid characters in expression.")]
    InvalidCharacters,

    #[error("expression longer than {MAX_EXPRESSION_LEN} bytes")]
    TooLong,

    #[error("expression nested too deeply")]
    TooDeep,

    #[error("invalid syntax at position {position}: unexpected '{found}'")]
    UnexpectedToken { found: String, position: usize },

    #[error("invalid syntax: unexpected end of expression")]
    UnexpectedEnd,

    #[error("leading zeros in decimal integer literals are not permitted (position {position})")]
    LeadingZeros { position: usize },

    #[error("{0}")]
    ZeroDivision(&'static str),

    #[error("{0}")]
    Overflow(&'static str),

    #[error("{0}")]
    Domain(&'static str),
}

/// Whether every character of `expression` belongs to the arithmetic alphabet.
///
/// The alphabet is ASCII digits, whitespace, `.`, parentheses and the
/// operator characters `+ - * / %`. An empty (or all-whitespace) input is
/// rejected.
pub fn is_arithmetic(expression: &str) -> bool {
    let trimmed = expression.trim();
    !trimmed.is_empty()
        && trimmed.chars().all(|c| {
            c.is_ascii_digit()
                || c.is_whitespace()
                || matches!(c, '+' | '-' | '*' | '/' | '%' | '(' | ')' | '.')
        })
}

/// Parse an expression into its AST without evaluating it.
pub fn parse(expression: &str) -> Result<Expr, ArithError> {
    let trimmed = expression.trim();
    if !is_arithmetic(trimmed) {
        return Err(ArithError::InvalidCharacters);
    }
    if trimmed.len() > MAX_EXPRESSION_LEN {
        return Err(ArithError::TooLong);
    }
    let tokens = lexer::tokenize(trimmed)?;
    parser::Parser::new(tokens).parse()
}

/// Parse and evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<Number, ArithError> {
    parse(expression)?.eval()
}

/// Evaluate an expression and render the outcome as text for a model.
///
/// Never fails: evaluation problems come back as `"Error: <reason>"`.
pub fn calculate(expression: &str) -> String {
    match evaluate(expression) {
        Ok(value) => value.to_string(),
        Err(err) => format!("Error: {err}"),
    }
}
