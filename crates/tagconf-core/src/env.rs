//! Environment access.
//!
//! Everything that reads environment variables goes through [`EnvProvider`],
//! so tests can use [`MockEnv`] instead of mutating the process environment.

use std::collections::HashMap;

/// Variables consulted, in order, for the deployment mode.
pub const DEPLOYMENT_ENV_VARS: [&str; 2] = ["APP_ENV", "RUST_ENV"];

/// Deployment modes that activate the strict environment audit.
pub const PRODUCTION_MODES: [&str; 2] = ["production", "prod"];

/// Read-only access to environment variables.
pub trait EnvProvider {
    /// Returns the value of a variable, or `None` if it is not set.
    fn var(&self, name: &str) -> Option<String>;

    /// Returns the deployment mode: the first non-empty variable of
    /// [`DEPLOYMENT_ENV_VARS`].
    fn deployment_mode(&self) -> Option<String> {
        DEPLOYMENT_ENV_VARS
            .iter()
            .find_map(|name| self.var(name).filter(|value| !value.is_empty()))
    }

    /// Returns `true` if the deployment mode names production.
    fn is_production(&self) -> bool {
        self.deployment_mode().is_some_and(|mode| {
            PRODUCTION_MODES
                .iter()
                .any(|accepted| mode.eq_ignore_ascii_case(accepted))
        })
    }
}

impl<E: EnvProvider + ?Sized> EnvProvider for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }

    fn deployment_mode(&self) -> Option<String> {
        (**self).deployment_mode()
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory environment for tests.
///
/// # Example
///
/// ```
/// use tagconf_core::env::{EnvProvider, MockEnv};
///
/// let env = MockEnv::new()
///     .with_var("APP_ENV", "Production")
///     .with_var("MYAPP_DB_PASSWORD", "secret");
///
/// assert!(env.is_production());
/// assert_eq!(env.var("MYAPP_DB_PASSWORD").as_deref(), Some("secret"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: HashMap<String, String>,
}

impl MockEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment with the deployment mode set to `production`.
    pub fn production() -> Self {
        Self::new().with_var(DEPLOYMENT_ENV_VARS[0], "production")
    }

    /// Add a variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Set a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Remove a variable.
    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

impl EnvProvider for MockEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for MockEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
