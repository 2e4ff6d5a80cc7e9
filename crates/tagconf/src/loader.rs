//! Configuration loader with layered approach.
//!
//! This module provides the [`Loader`] that materializes a configuration
//! type from defaults, an optional file and the environment, then audits and
//! validates it.

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tagconf_core::{Config, EnvProvider, ProcessEnv, StrictAuditor};
use tagconf_validator::{Locale, Validator};
use tracing::debug;
use validator::Validate;

use crate::bind::bind_env;
use crate::decode::{merge_record, rekey, FileType};
use crate::ConfigError;

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (`Default` impl, then `#[config(default = "...")]`)
/// 2. Configuration file (YAML, JSON or TOML), if one is found
/// 3. Environment variables (`APPNAME_SECTION_KEY`)
///
/// The result then passes the strict environment audit and validation.
///
/// # Example
///
/// ```no_run
/// use serde::{Deserialize, Serialize};
/// use tagconf::{Config, Loader, Locale};
/// use validator::Validate;
///
/// #[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
/// pub struct AppConfig {
///     #[config(default = "8080")]
///     #[validate(range(min = 1024))]
///     pub port: u16,
/// }
///
/// # fn main() -> Result<(), tagconf::ConfigError> {
/// let config: AppConfig = Loader::new("myapp")
///     .with_search_paths(["/etc/myapp", "."])
///     .with_locale(Some(Locale::En))
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Loader<E = ProcessEnv> {
    app_name: String,
    search_paths: Vec<PathBuf>,
    file_name: String,
    file_type: FileType,
    locale: Option<Locale>,
    env: E,
}

impl Loader<ProcessEnv> {
    /// Create a loader for `app_name`, which prefixes every environment key.
    ///
    /// Defaults: search paths `.` and `./config`, file name `config`, YAML,
    /// Chinese messages, the process environment.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            search_paths: vec![PathBuf::from("."), PathBuf::from("./config")],
            file_name: "config".to_string(),
            file_type: FileType::default(),
            locale: Some(Locale::Zh),
            env: ProcessEnv,
        }
    }
}

impl<E: EnvProvider> Loader<E> {
    /// Set the directories searched for the configuration file, in order.
    #[must_use]
    pub fn with_search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the file name without extension.
    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Set the file format.
    #[must_use]
    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = file_type;
        self
    }

    /// Set the validation message locale; `None` reports raw rule codes.
    #[must_use]
    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    /// Read environment variables from `env` instead of the process.
    pub fn with_env<F: EnvProvider>(self, env: F) -> Loader<F> {
        Loader {
            app_name: self.app_name,
            search_paths: self.search_paths,
            file_name: self.file_name,
            file_type: self.file_type,
            locale: self.locale,
            env,
        }
    }

    /// Load a `.env` file into the process environment.
    ///
    /// A missing `.env` file is not an error.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => debug!("no .env file found"),
            Err(e) => return Err(e.into()),
        }
        Ok(self)
    }

    /// The application name used as environment prefix.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Load, audit and validate a configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - A default literal does not parse
    /// - The file exists but cannot be read or parsed
    /// - The file contains a key no field maps to
    /// - An environment variable does not fit its field
    /// - A strict field is not set via the environment in production
    /// - Validation fails
    pub fn load<T>(&self) -> Result<T, ConfigError>
    where
        T: Config + Default + Serialize + DeserializeOwned + Validate,
    {
        let schema = T::config_schema();

        let mut tree = match schema.default_tree()? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        if let Some(file) = self.read_file()? {
            merge_record(schema, &mut tree, rekey(schema, file, "")?)?;
        }

        bind_env(&self.env, &self.app_name, schema, &mut tree)?;

        let config: T = serde_json::from_value(Value::Object(tree))
            .map_err(|e| ConfigError::decode("unmarshal", e))?;

        StrictAuditor::new(&self.env).audit(&self.app_name, &config)?;
        Validator::new(self.locale).validate(&config)?;

        debug!(app_name = %self.app_name, config = schema.name, "configuration loaded");
        Ok(config)
    }

    /// Like [`load`](Self::load), but panics on error.
    ///
    /// # Panics
    ///
    /// Panics with the load error if loading fails.
    #[track_caller]
    pub fn must_load<T>(&self) -> T
    where
        T: Config + Default + Serialize + DeserializeOwned + Validate,
    {
        match self.load() {
            Ok(config) => config,
            Err(e) => panic!("failed to load config: {e}"),
        }
    }

    /// Returns the first existing candidate file.
    fn locate(&self) -> Option<PathBuf> {
        self.search_paths.iter().find_map(|dir| {
            self.file_type
                .extensions()
                .iter()
                .map(|ext| dir.join(format!("{}.{ext}", self.file_name)))
                .find(|path| path.is_file())
        })
    }

    fn read_file(&self) -> Result<Option<Map<String, Value>>, ConfigError> {
        let Some(path) = self.locate() else {
            debug!(
                file_name = %self.file_name,
                file_type = %self.file_type,
                "no configuration file found, using defaults and environment"
            );
            return Ok(None);
        };

        debug!(path = %path.display(), "reading configuration file");
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::read_error(&path, e))?;
        self.file_type.parse(&content).map(Some)
    }
}

/// Load a configuration for `app_name` with the default loader settings.
pub fn load<T>(app_name: &str) -> Result<T, ConfigError>
where
    T: Config + Default + Serialize + DeserializeOwned + Validate,
{
    Loader::new(app_name).load()
}

/// Load a configuration for `app_name` with the default loader settings,
/// panicking on error.
///
/// # Panics
///
/// Panics with the load error if loading fails.
#[track_caller]
pub fn must_load<T>(app_name: &str) -> T
where
    T: Config + Default + Serialize + DeserializeOwned + Validate,
{
    Loader::new(app_name).must_load()
}
