//! Generator construction and argument access errors.

use thiserror::Error;

/// Error raised when a generator is built with invalid parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    #[error("invalid bounds: lower bound {lower} exceeds upper bound {upper}")]
    InvalidBounds { lower: i128, upper: i128 },

    #[error("choice over an empty collection")]
    EmptyChoice,

    #[error("weights must not all be zero")]
    ZeroWeights,

    #[error("bias must lie in [0, 1], found {bias}")]
    InvalidBias { bias: f64 },

    #[error("alphabet is empty")]
    EmptyAlphabet,
}

impl GenError {
    pub(crate) fn bounds(lower: impl Into<i128>, upper: impl Into<i128>) -> Self {
        GenError::InvalidBounds {
            lower: lower.into(),
            upper: upper.into(),
        }
    }
}

/// Error raised when a law reads an argument that is missing or has the
/// wrong type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("no argument named {name}")]
    Missing { name: String },

    #[error("argument {name}: expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Result type for generator construction.
pub type GenResult<T> = Result<T, GenError>;
