//! Error types for order validation.

use crate::expression::EvalError;
use thiserror::Error;

/// Reasons an order is refused before it enters the kitchen.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// The temperature is not one of `hot`, `cold`, `frozen`.
    #[error("unknown temperature: {0}")]
    UnknownTemperature(String),

    #[error("shelf life must be non-negative, got {0}")]
    NegativeShelfLife(i64),

    #[error("shelf life must fit in 32 bits, got {0}")]
    ShelfLifeTooLarge(i64),

    /// Negative or NaN decay rates are refused.
    #[error("decay rate must be a non-negative number, got {0}")]
    InvalidDecayRate(f64),

    #[error("decay formula is {len} bytes long, at most {limit} are accepted")]
    FormulaTooLong { len: usize, limit: usize },

    /// The decay formula does not evaluate with sample values substituted.
    #[error("invalid decay formula `{formula}`: {source}")]
    InvalidFormula {
        formula: String,
        #[source]
        source: EvalError,
    },
}
