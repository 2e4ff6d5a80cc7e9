//! Canonical key composition.
//!
//! Qualified keys are built one tree level at a time: the application name,
//! then each resolved key on the way down, joined by `_` and upper-cased so
//! the result reads like a conventional environment variable name
//! (`myapp` + `db` + `password` -> `MYAPP_DB_PASSWORD`).

/// Separator between key segments.
pub const SEPARATOR: char = '_';

/// Composes a qualified key from an accumulated prefix and a field key.
///
/// # Example
///
/// ```
/// use tagconf_core::path::compose;
///
/// assert_eq!(compose("", "host"), "HOST");
/// assert_eq!(compose("myapp", "db"), "MYAPP_DB");
/// assert_eq!(compose("MYAPP_DB", "password"), "MYAPP_DB_PASSWORD");
/// ```
pub fn compose(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        return key.to_uppercase();
    }

    let mut qualified = String::with_capacity(prefix.len() + 1 + key.len());
    qualified.push_str(prefix);
    qualified.push(SEPARATOR);
    qualified.push_str(key);
    qualified.to_uppercase()
}

/// Composes a qualified key from a full list of segments.
///
/// Equivalent to folding [`compose`] over the segments.
pub fn compose_all<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    segments
        .into_iter()
        .fold(String::new(), |prefix, segment| compose(&prefix, segment))
}
