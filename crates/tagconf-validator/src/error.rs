//! Validation error types.

use std::collections::BTreeMap;
use std::fmt;

use tagconf_core::BoxError;
use thiserror::Error;

/// Aggregate of every declarative rule violation, keyed by field path.
///
/// Paths use canonical key names joined by `.` (`settings.theme_mode`), with
/// list positions as `[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Message per field path.
    pub errors: BTreeMap<String, String>,
}

impl ValidationFailure {
    /// Returns the message for a field path.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if no field failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed:")?;
        for (field, message) in &self.errors {
            write!(f, "\n - {field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Errors produced by [`Validator::validate`](crate::Validator::validate).
#[derive(Error, Debug)]
pub enum ValidateError {
    /// Error returned by a self-validating type, unchanged.
    #[error("{0}")]
    SelfCheck(BoxError),

    /// Declarative rule violations.
    #[error(transparent)]
    Rules(#[from] ValidationFailure),
}

impl ValidateError {
    /// Returns the rule violations, if this is a declarative failure.
    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            ValidateError::Rules(failure) => Some(failure),
            ValidateError::SelfCheck(_) => None,
        }
    }
}
