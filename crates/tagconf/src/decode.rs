//! File decoding.
//!
//! A configuration file is parsed into a generic tree, its keys are mapped
//! from canonical keys to the names serde expects, and the result is merged
//! over the tree of default values.
//!
//! Scalars are loosely typed: `name: 123` fills a string field and
//! `port: "8080"` fills an integer field.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use tagconf_core::{FieldDescriptor, Scalar, Schema};

use crate::bind::{parse_bool, parse_number};
use crate::ConfigError;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FileType {
    /// YAML (`.yaml`, `.yml`).
    #[default]
    Yaml,
    /// JSON (`.json`).
    Json,
    /// TOML (`.toml`).
    Toml,
}

impl FileType {
    /// File extensions searched for this format, in order.
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            FileType::Yaml => &["yaml", "yml"],
            FileType::Json => &["json"],
            FileType::Toml => &["toml"],
        }
    }

    /// Lower-case format name.
    pub const fn as_str(self) -> &'static str {
        match self {
            FileType::Yaml => "yaml",
            FileType::Json => "json",
            FileType::Toml => "toml",
        }
    }

    /// Parses file content into a key/value tree.
    ///
    /// Empty content yields an empty tree.
    pub fn parse(self, content: &str) -> Result<Map<String, Value>, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        let value: Value = match self {
            FileType::Yaml => serde_yaml::from_str(content)?,
            FileType::Json => serde_json::from_str(content).map_err(ConfigError::Json)?,
            FileType::Toml => toml::from_str(content)?,
        };

        match value {
            Value::Null => Ok(Map::new()),
            Value::Object(map) => Ok(map),
            other => serde_json::from_value(other).map_err(|e| ConfigError::decode("read", e)),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(FileType::Yaml),
            "json" => Ok(FileType::Json),
            "toml" => Ok(FileType::Toml),
            other => Err(format!("unsupported configuration format: {other}")),
        }
    }
}

/// Renames the keys of a parsed file from canonical keys to serde names.
///
/// Keys match case-insensitively. A key that no exported field maps to is an
/// error. Nested objects are renamed through the nested schema when the field
/// has one, and passed through unchanged otherwise. Leaf scalars are converted
/// to the field's scalar kind where they parse as one.
pub fn rekey(
    schema: &'static Schema,
    map: Map<String, Value>,
    section: &str,
) -> Result<Map<String, Value>, ConfigError> {
    let mut out = Map::with_capacity(map.len());

    for (key, value) in map {
        let field = schema
            .field_by_key(&key)
            .ok_or_else(|| ConfigError::unknown_field(&key, section))?;

        let value = match (field.nested_schema(), value) {
            (Some(nested), Value::Object(inner)) => {
                let path = if section.is_empty() {
                    field.display_name().to_string()
                } else {
                    format!("{section}.{}", field.display_name())
                };
                Value::Object(rekey(nested, inner, &path)?)
            }
            (_, value) => weaken(field.scalar(), value),
        };

        out.insert(field.serde_name.to_string(), value);
    }

    Ok(out)
}

fn weaken(scalar: Scalar, value: Value) -> Value {
    match (scalar, value) {
        (Scalar::Text, Value::Number(n)) => Value::String(n.to_string()),
        (Scalar::Text, Value::Bool(b)) => Value::String(b.to_string()),
        (Scalar::Bool, Value::String(s)) => parse_bool(&s).map_or(Value::String(s), Value::Bool),
        (Scalar::Bool, Value::Number(n)) => match n.as_i64() {
            Some(i) => Value::Bool(i != 0),
            None => Value::Number(n),
        },
        (Scalar::Integer, Value::String(s)) => {
            parse_number(&s, false).map_or(Value::String(s), Value::Number)
        }
        (Scalar::Float, Value::String(s)) => {
            parse_number(&s, true).map_or(Value::String(s), Value::Number)
        }
        (Scalar::Integer | Scalar::Float, Value::Bool(b)) => Value::from(u8::from(b)),
        (_, value) => value,
    }
}

/// Merges a re-keyed file tree into the tree of default values.
///
/// A nested block that is unset in `base` (an optional record) is seeded
/// with the record's default value first, so the file may set it in part.
pub fn merge_record(
    schema: &'static Schema,
    base: &mut Map<String, Value>,
    overlay: Map<String, Value>,
) -> Result<(), ConfigError> {
    for (key, value) in overlay {
        let nested = schema.field(&key).and_then(FieldDescriptor::nested_schema);

        match (nested, value) {
            (Some(nested), Value::Object(inner)) => {
                let slot = base.entry(key).or_insert(Value::Null);
                if !slot.is_object() {
                    *slot = nested.default_tree()?;
                }
                match slot {
                    Value::Object(map) => merge_record(nested, map, inner)?,
                    other => *other = Value::Object(inner),
                }
            }
            (_, value) => match base.get_mut(&key) {
                Some(slot) => merge(slot, value),
                None => {
                    base.insert(key, value);
                }
            },
        }
    }

    Ok(())
}

/// Deep-merges `overlay` into `base`. Objects merge key by key; any other
/// value replaces what is in `base`.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
