//! Cardinality error types.

use thiserror::Error;

/// A cardinality evaluation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("variable '{name}' has no binding")]
    UnboundVariable { name: String },
}

/// Result type for cardinality operations.
pub type CardResult<T> = Result<T, CardError>;
