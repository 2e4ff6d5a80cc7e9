//! Error types for the core engine.

use thiserror::Error;

/// A field flagged `env = "strict"` is not backed by an environment variable.
///
/// Raised only in production; the load must be aborted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "security check failed: field '{field}' (key: '{key}') must be set via environment variable '{variable}' in production"
)]
pub struct StrictEnvError {
    /// Raw field identifier.
    pub field: String,
    /// Resolved key of the field.
    pub key: String,
    /// Fully qualified environment variable that was missing or empty.
    pub variable: String,
}

impl StrictEnvError {
    /// Create a new strict environment error.
    pub fn new(
        field: impl Into<String>,
        key: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            key: key.into(),
            variable: variable.into(),
        }
    }
}

/// A default literal could not be parsed into its field type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid default '{literal}' for field '{field}': {reason}")]
pub struct DefaultError {
    /// Raw field identifier.
    pub field: String,
    /// The literal as written in the attribute.
    pub literal: String,
    /// Parser message.
    pub reason: String,
}

impl DefaultError {
    /// Create a new default error.
    pub fn new(
        field: impl Into<String>,
        literal: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            literal: literal.into(),
            reason: reason.into(),
        }
    }
}
