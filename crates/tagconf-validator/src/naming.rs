//! Field naming for rule violations.
//!
//! The rule evaluator reports violations under Rust field names. This module
//! walks its report alongside the configuration [`Schema`] and renames every
//! segment to the field's canonical key, so that validation messages use the
//! same names as the configuration file and the environment.

use tagconf_core::Schema;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// A violation located by its canonical field path.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedViolation<'a> {
    /// Dotted path of canonical names, e.g. `settings.theme_mode`.
    pub path: String,
    /// Canonical name of the failing field itself, e.g. `theme_mode`.
    pub field: String,
    /// The violation as reported by the rule evaluator.
    pub error: &'a ValidationError,
}

/// Flattens `errors` into violations named through `schema`.
///
/// Names the schema does not know (a struct-level rule, or a field inside a
/// type without a schema) are kept as reported.
pub fn name_violations<'a>(
    schema: Option<&'static Schema>,
    errors: &'a ValidationErrors,
) -> Vec<NamedViolation<'a>> {
    let mut out = Vec::new();
    collect(schema, errors, "", &mut out);
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

fn collect<'a>(
    schema: Option<&'static Schema>,
    errors: &'a ValidationErrors,
    prefix: &str,
    out: &mut Vec<NamedViolation<'a>>,
) {
    for (raw, kind) in errors.errors() {
        let raw: &str = raw;
        let descriptor = schema.and_then(|s| s.field(raw));
        let name = descriptor.map_or(raw, |d| d.display_name());
        let nested = descriptor.and_then(|d| d.nested_schema());
        let path = join(prefix, name);

        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|error| NamedViolation {
                    path: path.clone(),
                    field: name.to_string(),
                    error,
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(nested, inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(nested, inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
