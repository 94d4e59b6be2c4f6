use serde::Serialize;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FormError>;

/// Unified error type for form configuration and compilation.
///
/// Each variant represents a category of failure. Recoverable conditions
/// (bad expressions at evaluation time, missing custom functions) are not
/// errors at all: they are logged and evaluate to a fail-closed default.
/// The variants here are the non-recoverable, construction-time failures.
#[derive(Debug, Clone, Serialize, Error)]
pub enum FormError {
    /// The configuration is structurally invalid (illegal nesting, duplicate keys)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A field descriptor carries contradictory or unusable settings
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// An expression could not be parsed in the restricted grammar
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// A pattern validator carried a string that is not a valid regex
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// A `schemas` entry referenced a name missing from the schema table
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// The raw configuration could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
