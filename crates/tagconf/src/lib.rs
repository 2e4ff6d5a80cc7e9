//! Typed configuration loading for Rust services.
//!
//! This crate turns a plain struct into a configuration schema with
//! `#[derive(Config)]` and loads it from layered sources:
//! - default literals declared on fields
//! - a YAML, JSON or TOML file (optional, unknown keys rejected)
//! - environment variables prefixed with the application name
//!
//! In production (`APP_ENV` or `RUST_ENV` set to `production` or `prod`),
//! fields marked `env = "strict"` must come from the environment. The loaded
//! value is then validated with the [`validator`] crate or with the type's
//! own [`SelfValidate`] impl.
//!
//! # Keys
//!
//! A field's key is taken from the first naming family that names it:
//! `key`, `yaml`, `json`, `toml`, then the field identifier. The same key is
//! used in files, in environment variables (`MYAPP_DATABASE_HOST`) and in
//! validation messages (`database.host`).
//!
//! # Example
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use tagconf::{Config, Loader};
//! use validator::Validate;
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
//! pub struct Database {
//!     #[validate(length(min = 1))]
//!     pub host: String,
//!     #[config(default = "3306")]
//!     #[validate(range(min = 1024))]
//!     pub port: u16,
//!     #[config(env = "strict")]
//!     pub password: String,
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
//! pub struct AppConfig {
//!     #[config(default = "TestApp")]
//!     pub app_name: String,
//!     pub debug: bool,
//!     #[validate(nested)]
//!     pub database: Database,
//! }
//!
//! let config: AppConfig = Loader::new("myapp").must_load();
//! println!("connecting to {}:{}", config.database.host, config.database.port);
//! ```
//!
//! # Configuration File Format
//!
//! ```yaml
//! app_name: MyCoolApp
//! database:
//!   host: 127.0.0.1
//!   port: 5432
//! ```

#![doc(html_root_url = "https://docs.rs/tagconf/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bind;
mod decode;
mod error;
mod loader;

pub use decode::FileType;
pub use error::ConfigError;
pub use loader::{load, must_load, Loader};

pub use tagconf_core::{
    check_env_strict, compose, resolve_key, BoxError, Config, DefaultError, EnvProvider,
    FieldDescriptor, FieldTags, Key, MockEnv, Node, NodeRef, ProcessEnv, Record, Scalar, Schema,
    SelfValidate, StrictAuditor, StrictEnvError,
};
pub use tagconf_macros::Config;
pub use tagconf_validator::{Locale, ValidateError, ValidationFailure, Validator};

#[doc(hidden)]
pub mod __private {
    pub use tagconf_core::schema::{
        default_tree, no_scalar, no_schema, parse_default, Config, FieldDescriptor, Node,
        NodeRef, Record, Schema, SelfValidate,
    };
    pub use tagconf_core::{DefaultError, FieldTags};
}
