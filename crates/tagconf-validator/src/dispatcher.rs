//! Validation dispatch.

use std::collections::btree_map::Entry;

use tagconf_core::Config;
use tracing::debug;
use validator::Validate;

use crate::error::{ValidateError, ValidationFailure};
use crate::locale::{render, Locale};
use crate::naming::name_violations;

/// Validates decoded configuration values.
///
/// A value whose type declares self-validation is checked by that method
/// alone and its error is passed through unchanged. Every other value is
/// checked against its declarative rules; violations are reported under
/// canonical key names and rendered in the configured locale.
///
/// # Example
///
/// ```ignore
/// use tagconf_validator::{Locale, Validator};
///
/// let validator = Validator::new(Some(Locale::En));
/// if let Err(err) = validator.validate(&config) {
///     eprintln!("{err}");
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    locale: Option<Locale>,
}

impl Validator {
    /// Creates a validator. `None` reports raw rule codes.
    pub const fn new(locale: Option<Locale>) -> Self {
        Self { locale }
    }

    /// Creates a validator from a locale tag such as `"en"` or `"zh"`.
    pub fn from_tag(tag: &str) -> Self {
        Self::new(Locale::from_tag(tag))
    }

    /// The message locale.
    pub const fn locale(&self) -> Option<Locale> {
        self.locale
    }

    /// Validates `value`.
    ///
    /// Self-validating types still need a `Validate` impl to satisfy the
    /// bound; its rules are not run.
    pub fn validate<T>(&self, value: &T) -> Result<(), ValidateError>
    where
        T: Config + Validate,
    {
        let schema = T::config_schema();

        if let Some(checker) = value.self_validating() {
            debug!(config = schema.name, "running self-validation");
            return checker.check().map_err(ValidateError::SelfCheck);
        }

        let Err(errors) = Validate::validate(value) else {
            debug!(config = schema.name, "validation passed");
            return Ok(());
        };

        let mut failure = ValidationFailure::default();
        for violation in name_violations(Some(schema), &errors) {
            if let Entry::Vacant(slot) = failure.errors.entry(violation.path) {
                slot.insert(render(self.locale, &violation.field, violation.error));
            }
        }

        debug!(
            config = schema.name,
            fields = failure.len(),
            "validation failed"
        );
        Err(ValidateError::Rules(failure))
    }
}
