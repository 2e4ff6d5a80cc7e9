//! Canonical key resolution.
//!
//! A field can carry several naming annotations at once, one per convention
//! family. The key is taken from the first family that yields a name, in the
//! fixed order:
//!
//! 1. `key` (the primary mapping, also used by the decoder)
//! 2. `yaml`
//! 3. `json`
//! 4. `toml`
//! 5. the raw field identifier
//!
//! A family value may carry options after a comma (`"password,omitempty"`);
//! only the text before the first comma is the name. A name of `"-"` stops
//! resolution: the field has no key at all, whatever the other families say.

/// Name that marks a field as explicitly ignored.
pub const IGNORE_MARKER: &str = "-";

/// Separator between a name and its options inside a family value.
pub const OPTION_SEPARATOR: char = ',';

/// Naming convention families, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Primary mapping (`#[config(key = "...")]`).
    Key,
    /// YAML-style name (`#[config(yaml = "...")]`).
    Yaml,
    /// JSON-style name (`#[config(json = "...")]`).
    Json,
    /// TOML-style name (`#[config(toml = "...")]`).
    Toml,
}

impl Family {
    /// All families in the order they are consulted.
    pub const CHAIN: [Family; 4] = [Family::Key, Family::Yaml, Family::Json, Family::Toml];

    /// Attribute name of the family.
    pub const fn as_str(self) -> &'static str {
        match self {
            Family::Key => "key",
            Family::Yaml => "yaml",
            Family::Json => "json",
            Family::Toml => "toml",
        }
    }
}

/// The naming annotations present on one field.
///
/// `None` and `Some("")` are equivalent: the family is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldTags<'a> {
    /// Primary mapping value.
    pub key: Option<&'a str>,
    /// YAML family value.
    pub yaml: Option<&'a str>,
    /// JSON family value.
    pub json: Option<&'a str>,
    /// TOML family value.
    pub toml: Option<&'a str>,
}

impl<'a> FieldTags<'a> {
    /// Tags with no family present.
    pub const fn none() -> Self {
        Self {
            key: None,
            yaml: None,
            json: None,
            toml: None,
        }
    }

    /// Returns the raw value of one family.
    pub const fn get(&self, family: Family) -> Option<&'a str> {
        match family {
            Family::Key => self.key,
            Family::Yaml => self.yaml,
            Family::Json => self.json,
            Family::Toml => self.toml,
        }
    }
}

/// Outcome of consulting a single family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The family names the field.
    Found(&'a str),
    /// The family marks the field as ignored.
    Ignored,
    /// The family is absent or empty; try the next one.
    Fallthrough,
}

/// Final result of key resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    /// The canonical key name of the field.
    Named(&'a str),
    /// The field is excluded from keyed configuration.
    Ignored,
}

impl<'a> Key<'a> {
    /// Returns the key name, or `None` for an ignored field.
    pub const fn name(self) -> Option<&'a str> {
        match self {
            Key::Named(name) => Some(name),
            Key::Ignored => None,
        }
    }

    /// Returns `true` if the field is ignored.
    pub const fn is_ignored(self) -> bool {
        matches!(self, Key::Ignored)
    }
}

/// Consults one family value.
///
/// # Example
///
/// ```
/// use tagconf_core::key::{resolve_family, Resolution};
///
/// assert_eq!(resolve_family(Some("password,omitempty")), Resolution::Found("password"));
/// assert_eq!(resolve_family(Some("-")), Resolution::Ignored);
/// assert_eq!(resolve_family(Some("")), Resolution::Fallthrough);
/// assert_eq!(resolve_family(None), Resolution::Fallthrough);
/// ```
pub fn resolve_family(tag: Option<&str>) -> Resolution<'_> {
    let Some(tag) = tag else {
        return Resolution::Fallthrough;
    };

    let name = tag
        .split_once(OPTION_SEPARATOR)
        .map_or(tag, |(name, _options)| name);

    match name {
        "" => Resolution::Fallthrough,
        IGNORE_MARKER => Resolution::Ignored,
        name => Resolution::Found(name),
    }
}

/// Resolves the canonical key of a field.
///
/// Resolution is total: when no family yields a name the raw identifier is
/// used. A leading `r#` on the identifier is dropped.
///
/// # Example
///
/// ```
/// use tagconf_core::key::{resolve_key, FieldTags, Key};
///
/// let tags = FieldTags {
///     key: Some("db_user"),
///     json: Some("user"),
///     yaml: Some("u"),
///     ..FieldTags::none()
/// };
/// assert_eq!(resolve_key(&tags, "user"), Key::Named("db_user"));
/// assert_eq!(resolve_key(&FieldTags::none(), "port"), Key::Named("port"));
/// ```
pub fn resolve_key<'a>(tags: &FieldTags<'a>, ident: &'a str) -> Key<'a> {
    for family in Family::CHAIN {
        match resolve_family(tags.get(family)) {
            Resolution::Found(name) => return Key::Named(name),
            Resolution::Ignored => return Key::Ignored,
            Resolution::Fallthrough => {}
        }
    }

    Key::Named(ident.strip_prefix("r#").unwrap_or(ident))
}
