//! Error types for the decay expression evaluator.

use thiserror::Error;

/// Why a decay formula could not produce a value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    /// The text is not a valid arithmetic expression (unknown token,
    /// unbalanced parentheses, dangling operator, trailing input).
    #[error("malformed expression `{expression}` near `{remaining}`")]
    Malformed {
        expression: String,
        remaining: String,
    },

    /// The expression parsed but produced NaN or an infinity (e.g. `1/0`).
    #[error("expression `{0}` did not evaluate to a finite number")]
    NonFinite(String),

    /// Parentheses or unary minus nest deeper than the parser allows.
    #[error("expression `{expression}` nests deeper than {limit} levels")]
    TooDeep { expression: String, limit: usize },
}
