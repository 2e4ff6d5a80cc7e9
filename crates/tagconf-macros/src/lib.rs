//! Derive macro for tagconf configuration types.
//!
//! `#[derive(Config)]` turns the naming and source annotations on a struct's
//! fields into a static schema, and implements the instance walk used by
//! default application, the strict environment audit and validation.
//!
//! Use it through the `tagconf` crate, which re-exports it.

mod expand;
mod parse;

use proc_macro::TokenStream;

/// Derives `tagconf::Config` for a struct with named fields.
///
/// The struct must implement `Default` and `Serialize`: the encoded default
/// value seeds optional blocks that a file or the environment sets only in
/// part.
///
/// # Field attributes
///
/// - `key = "..."`: primary key, also the name used in configuration files
/// - `yaml = "..."`, `json = "..."`, `toml = "..."`: alternative naming
///   families, consulted in that order after `key`; a name of `"-"` ignores
///   the field for keyed configuration
/// - `env = "strict"`: in production the value must come from the environment
/// - `default = "..."`: literal parsed into the field type with `FromStr`
///   before loading; rejected on `Duration`, collections and other types
///   without a `FromStr` impl
/// - `leaf`: treat the field type as an opaque value even if it has no
///   `Node` impl
///
/// # Container attributes
///
/// - `self_validate`: validate through the type's `SelfValidate` impl
///   instead of its declarative rules
///
/// # Example
///
/// ```rust,ignore
/// use serde::{Deserialize, Serialize};
/// use tagconf::Config;
/// use validator::Validate;
///
/// #[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
/// pub struct Database {
///     #[config(default = "localhost")]
///     pub host: String,
///     #[config(yaml = "db_port", default = "3306")]
///     #[validate(range(min = 1024))]
///     pub port: u16,
///     #[config(env = "strict")]
///     pub password: String,
/// }
/// ```
#[proc_macro_derive(Config, attributes(config))]
pub fn derive_config(input: TokenStream) -> TokenStream {
    expand::expand_config(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
