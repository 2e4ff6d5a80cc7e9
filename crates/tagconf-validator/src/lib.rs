//! # tagconf validator
//!
//! Validation dispatch for tagconf configuration values.
//!
//! Declarative rules come from the [`validator`] crate. Violations are
//! reported under the same canonical key names the configuration file and
//! environment use, with messages in English, Chinese, or as raw rule codes.
//! Types that declare self-validation skip declarative rules entirely.

#![doc(html_root_url = "https://docs.rs/tagconf-validator/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatcher;
mod error;
pub mod locale;
pub mod naming;

pub use dispatcher::Validator;
pub use error::{ValidateError, ValidationFailure};
pub use locale::{render, Locale};
