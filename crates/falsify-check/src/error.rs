//! Error types for property construction, allocation and law evaluation.

use falsify_card::CardError;
use falsify_gen::{ArgError, GenError};
use thiserror::Error;

/// Error raised while assembling or running a suite.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    #[error("duplicate property name: {name}")]
    DuplicateProperty { name: String },

    #[error("duplicate spec name: {name}")]
    DuplicateSpec { name: String },

    #[error("property {property}: duplicate parameter {parameter}")]
    DuplicateParameter { property: String, parameter: String },

    #[error("property {property}: invalid generator for parameter {parameter}: {source}")]
    InvalidGenerator {
        property: String,
        parameter: String,
        source: GenError,
    },

    #[error("no calibration recorded for property {name}")]
    UnknownProperty { name: String },

    #[error("cardinality evaluation failed: {0}")]
    Cardinality(#[from] CardError),
}

/// Result type for suite assembly and allocation.
pub type CheckResult<T> = Result<T, CheckError>;

/// Failure raised by a law, as opposed to the law returning `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LawError {
    #[error("{0}")]
    Raised(String),

    #[error("law panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Argument(#[from] ArgError),
}

impl LawError {
    pub fn raised(message: impl Into<String>) -> Self {
        LawError::Raised(message.into())
    }
}
