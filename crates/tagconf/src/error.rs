//! Configuration error types.

use std::path::PathBuf;

use tagconf_core::{DefaultError, StrictEnvError};
use tagconf_validator::ValidateError;
use thiserror::Error;

/// Errors that can occur while loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file that exists.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error.
    #[error("failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON configuration: {0}")]
    Json(#[source] serde_json::Error),

    /// TOML parsing error.
    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Key in the configuration file that no field maps to.
    #[error("unknown configuration field: {field} in section {section}")]
    UnknownField {
        /// The unknown key.
        field: String,
        /// Dotted path of the section containing the key; empty for the root.
        section: String,
    },

    /// A `.env` file exists but could not be loaded.
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// A default literal does not parse into its field type.
    #[error(transparent)]
    InvalidDefault(#[from] DefaultError),

    /// Environment variable whose value does not fit the field type.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// Explanation of the parsing error.
        reason: String,
    },

    /// The merged sources do not deserialize into the configuration type.
    #[error("{operation} config: {source}")]
    Decode {
        /// Stage that failed.
        operation: &'static str,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A secret is not backed by the environment in production.
    #[error(transparent)]
    StrictEnv(#[from] StrictEnvError),

    /// The configuration failed validation.
    #[error(transparent)]
    Validation(#[from] ValidateError),
}

impl ConfigError {
    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a new unknown field error.
    pub fn unknown_field(field: impl Into<String>, section: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
            section: section.into(),
        }
    }

    /// Create a new environment variable parse error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Create a new decode error.
    pub fn decode(operation: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { operation, source }
    }
}
