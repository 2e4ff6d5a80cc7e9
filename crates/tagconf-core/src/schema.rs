//! Static schema model and the instance walk.
//!
//! A configuration type describes itself twice:
//!
//! - statically, as a [`Schema`]: one [`FieldDescriptor`] per field with its
//!   naming tags, strictness marker and default literal;
//! - per instance, through [`Record::field_nodes`], which tells for each field
//!   whether its current value is a leaf, a nested record, or an absent
//!   optional record.
//!
//! Both are normally generated by `#[derive(Config)]`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DefaultError;
use crate::key::{resolve_key, FieldTags, Key};

/// Boxed error returned by self-validating configuration types.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Static description of one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Raw field identifier.
    pub ident: &'static str,
    /// Name the serde derive uses for this field.
    pub serde_name: &'static str,
    /// Naming annotations, one per family.
    pub tags: FieldTags<'static>,
    /// Whether the field is visible outside its module (`pub` in any form).
    pub exported: bool,
    /// Whether the field must be backed by an environment variable in production.
    pub env_strict: bool,
    /// Default literal applied before decoding.
    pub default: Option<&'static str>,
    /// Schema of the field type when it is a nested record.
    pub nested: fn() -> Option<&'static Schema>,
    /// Scalar kind of the field type.
    pub kind: fn() -> Scalar,
}

impl FieldDescriptor {
    /// Resolves the canonical key of this field.
    pub fn key(&self) -> Key<'static> {
        resolve_key(&self.tags, self.ident)
    }

    /// Name used when reporting this field to users.
    ///
    /// Same as [`key`](Self::key), except that an ignored field is reported
    /// under its raw identifier.
    pub fn display_name(&self) -> &'static str {
        match self.key() {
            Key::Named(name) => name,
            Key::Ignored => self.ident.strip_prefix("r#").unwrap_or(self.ident),
        }
    }

    /// Schema of the nested record, if any.
    pub fn nested_schema(&self) -> Option<&'static Schema> {
        (self.nested)()
    }

    /// Scalar kind used to coerce loosely typed input.
    pub fn scalar(&self) -> Scalar {
        (self.kind)()
    }
}

/// Shape of a leaf value, as far as loosely typed input is concerned.
///
/// Files and environment variables can carry `8080` for a string field or
/// `"8080"` for a port; the loader converts such values by this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    /// Deserialized from a string.
    Text,
    /// A boolean.
    Bool,
    /// An integer.
    Integer,
    /// A floating point number.
    Float,
    /// Anything else; input is passed through unchanged.
    Other,
}

/// Static description of a configuration record.
#[derive(Debug)]
pub struct Schema {
    /// Type name.
    pub name: &'static str,
    /// Fields in declaration order.
    pub fields: &'static [FieldDescriptor],
    /// Encodes the record's default value, with default literals applied.
    pub defaults: fn() -> Result<Value, DefaultError>,
}

impl Schema {
    /// The default value of the record as a serde tree.
    ///
    /// Used to fill an optional block that input sets only partially.
    pub fn default_tree(&self) -> Result<Value, DefaultError> {
        (self.defaults)()
    }

    /// Finds a field by its raw identifier or serde name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.ident == name || f.serde_name == name)
    }

    /// Finds an exported, non-ignored field whose canonical key matches `key`
    /// case-insensitively.
    pub fn field_by_key(&self, key: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| {
            f.exported
                && f.key()
                    .name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(key))
        })
    }
}

/// How a field value looks to the instance walk.
#[derive(Clone, Copy)]
pub enum NodeRef<'a> {
    /// A scalar, string, collection or any other non-record value.
    Leaf,
    /// A populated nested record.
    Record(&'a dyn Record),
    /// An optional nested record that is not set.
    Absent,
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRef::Leaf => f.write_str("Leaf"),
            NodeRef::Record(record) => write!(f, "Record({})", record.record_schema().name),
            NodeRef::Absent => f.write_str("Absent"),
        }
    }
}

/// A value that can appear as a configuration field.
///
/// The provided methods describe a leaf. Record types override all three
/// (the derive does this); wrappers such as `Option` and `Box` delegate.
///
/// Custom leaf types opt in with an empty impl:
///
/// ```
/// use tagconf_core::Node;
///
/// enum LogFormat { Json, Pretty }
///
/// impl Node for LogFormat {}
/// ```
pub trait Node {
    /// Schema of the type when it is a record.
    fn schema() -> Option<&'static Schema>
    where
        Self: Sized,
    {
        None
    }

    /// Scalar kind of the type when it is a leaf.
    fn scalar() -> Scalar
    where
        Self: Sized,
    {
        Scalar::Other
    }

    /// Classifies this value for the instance walk.
    fn node(&self) -> NodeRef<'_> {
        NodeRef::Leaf
    }

    /// Applies default literals to this value and everything below it.
    fn apply_defaults(&mut self) -> Result<(), DefaultError> {
        Ok(())
    }
}

/// Object-safe view of a configuration record.
pub trait Record {
    /// Static schema of the record.
    fn record_schema(&self) -> &'static Schema;

    /// One node per schema field, in the same order as `record_schema().fields`.
    fn field_nodes(&self) -> Vec<NodeRef<'_>>;
}

/// Self-validation capability.
///
/// A type that implements this and is declared `#[config(self_validate)]`
/// is validated by [`check`](Self::check) alone; declarative rules are not
/// evaluated. Without the container attribute the impl is never consulted
/// and the `validator` rules apply as usual.
pub trait SelfValidate {
    /// Validates the whole value.
    fn check(&self) -> Result<(), BoxError>;
}

/// A root configuration type.
pub trait Config: Node + Record {
    /// Static schema of the type.
    fn config_schema() -> &'static Schema
    where
        Self: Sized;

    /// Returns the self-validation capability when the type has one.
    fn self_validating(&self) -> Option<&dyn SelfValidate> {
        None
    }
}

impl<T: Node> Node for Option<T> {
    fn schema() -> Option<&'static Schema> {
        T::schema()
    }

    fn scalar() -> Scalar {
        T::scalar()
    }

    fn node(&self) -> NodeRef<'_> {
        match self {
            Some(value) => value.node(),
            None if T::schema().is_some() => NodeRef::Absent,
            None => NodeRef::Leaf,
        }
    }

    fn apply_defaults(&mut self) -> Result<(), DefaultError> {
        match self {
            Some(value) => value.apply_defaults(),
            None => Ok(()),
        }
    }
}

impl<T: Node> Node for Box<T> {
    fn schema() -> Option<&'static Schema> {
        T::schema()
    }

    fn scalar() -> Scalar {
        T::scalar()
    }

    fn node(&self) -> NodeRef<'_> {
        (**self).node()
    }

    fn apply_defaults(&mut self) -> Result<(), DefaultError> {
        (**self).apply_defaults()
    }
}

macro_rules! impl_leaf {
    ($kind:ident: $($ty:ty),* $(,)?) => {
        $(impl Node for $ty {
            fn scalar() -> Scalar {
                Scalar::$kind
            }
        })*
    };
}

impl_leaf!(Text: char, String, PathBuf, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);
impl_leaf!(Bool: bool);
impl_leaf!(Integer: u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
impl_leaf!(Float: f32, f64);

// Deserialized from a `{secs, nanos}` map, never from a literal.
impl Node for Duration {}

impl<T> Node for Vec<T> {}
impl<T> Node for HashSet<T> {}
impl<T> Node for BTreeSet<T> {}
impl<K, V> Node for HashMap<K, V> {}
impl<K, V> Node for BTreeMap<K, V> {}

/// Schema function for fields that are never records.
pub fn no_schema() -> Option<&'static Schema> {
    None
}

/// Scalar function for fields whose type is opaque to the loader.
pub fn no_scalar() -> Scalar {
    Scalar::Other
}

/// Encodes `T::default()` with its default literals applied.
pub fn default_tree<T>() -> Result<Value, DefaultError>
where
    T: Node + Default + Serialize,
{
    let mut value = T::default();
    value.apply_defaults()?;
    serde_json::to_value(&value).map_err(|e| {
        DefaultError::new(std::any::type_name::<T>(), "Default::default()", e.to_string())
    })
}

/// Defaults function for hand-written schemas with no default tree.
pub fn empty_defaults() -> Result<Value, DefaultError> {
    Ok(Value::Object(Map::new()))
}

/// Parses a default literal into the field type.
pub fn parse_default<T>(field: &'static str, literal: &'static str) -> Result<T, DefaultError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    literal
        .parse()
        .map_err(|e: T::Err| DefaultError::new(field, literal, e.to_string()))
}
