//! # tagconf core
//!
//! Key resolution and the strict environment audit for tagconf.
//!
//! This crate provides the pieces every other tagconf crate builds on:
//!
//! - [`key`] - canonical key resolution over several naming families
//! - [`path`] - composition of qualified, upper-cased keys
//! - [`schema`] - the static [`Schema`] model and the [`Node`] instance walk
//! - [`env`] - the [`EnvProvider`] abstraction over environment variables
//! - [`audit`] - the [`StrictAuditor`] that keeps secrets out of files in production
//!
//! Key names are the same everywhere: the decoder, environment binding, the
//! strict audit and validation messages all go through [`key::resolve_key`].

#![doc(html_root_url = "https://docs.rs/tagconf-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod audit;
pub mod env;
mod error;
pub mod key;
pub mod path;
pub mod schema;

pub use audit::{check_env_strict, StrictAuditor};
pub use env::{EnvProvider, MockEnv, ProcessEnv};
pub use error::{DefaultError, StrictEnvError};
pub use key::{resolve_key, FieldTags, Key};
pub use path::compose;
pub use schema::{
    BoxError, Config, FieldDescriptor, Node, NodeRef, Record, Scalar, Schema, SelfValidate,
};
