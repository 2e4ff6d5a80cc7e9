//! Environment binding.
//!
//! Every exported leaf of the schema can be overridden by the variable named
//! by its qualified key: `app_name` and the canonical keys along the field
//! path, joined by `_` and upper-cased (`MYAPP_DATABASE_HOST`). Empty
//! variables are ignored.

use serde_json::{Map, Number, Value};
use tagconf_core::{compose, EnvProvider, Scalar, Schema};
use tracing::debug;

use crate::ConfigError;

/// Applies environment overrides to `tree`, which uses serde names.
pub fn bind_env<E: EnvProvider + ?Sized>(
    env: &E,
    app_name: &str,
    schema: &'static Schema,
    tree: &mut Map<String, Value>,
) -> Result<(), ConfigError> {
    bind_record(env, app_name, schema, tree).map(drop)
}

/// Returns `true` if any variable below `prefix` was applied.
fn bind_record<E: EnvProvider + ?Sized>(
    env: &E,
    prefix: &str,
    schema: &'static Schema,
    tree: &mut Map<String, Value>,
) -> Result<bool, ConfigError> {
    let mut changed = false;

    for field in schema.fields.iter().filter(|f| f.exported) {
        let Some(key) = field.key().name() else {
            continue;
        };
        let qualified = compose(prefix, key);

        if let Some(nested) = field.nested_schema() {
            if let Some(Value::Object(inner)) = tree.get_mut(field.serde_name) {
                changed |= bind_record(env, &qualified, nested, inner)?;
            } else {
                // Only materialize an unset block when something inside it is set.
                let mut inner = match nested.default_tree()? {
                    Value::Object(seed) => seed,
                    _ => Map::new(),
                };
                if bind_record(env, &qualified, nested, &mut inner)? {
                    tree.insert(field.serde_name.to_string(), Value::Object(inner));
                    changed = true;
                }
            }
            continue;
        }

        let Some(raw) = env.var(&qualified).filter(|value| !value.is_empty()) else {
            continue;
        };

        let value = coerce(&qualified, &raw, field.scalar(), tree.get(field.serde_name))?;
        debug!(variable = %qualified, field = field.ident, "environment override applied");
        tree.insert(field.serde_name.to_string(), value);
        changed = true;
    }

    Ok(changed)
}

/// Converts a raw variable into the field's scalar kind, or for other types
/// into the shape of the value it replaces.
///
/// Without either (an unset optional field of an opaque type) booleans and
/// numbers are recognized and everything else stays a string.
fn coerce(
    variable: &str,
    raw: &str,
    scalar: Scalar,
    current: Option<&Value>,
) -> Result<Value, ConfigError> {
    match scalar {
        Scalar::Text => return Ok(Value::String(raw.to_string())),
        Scalar::Bool => {
            return parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| ConfigError::env_parse_error(variable, "expected boolean"))
        }
        Scalar::Integer | Scalar::Float => {
            return parse_number(raw, scalar == Scalar::Float)
                .map(Value::Number)
                .ok_or_else(|| ConfigError::env_parse_error(variable, "expected number"))
        }
        Scalar::Other => {}
    }

    match current {
        Some(Value::String(_)) => Ok(Value::String(raw.to_string())),
        Some(Value::Bool(_)) => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| ConfigError::env_parse_error(variable, "expected boolean")),
        Some(Value::Number(current)) => parse_number(raw, current.is_f64())
            .map(Value::Number)
            .ok_or_else(|| ConfigError::env_parse_error(variable, "expected number")),
        Some(Value::Array(_)) => Ok(parse_list(raw)),
        Some(Value::Object(_)) => serde_json::from_str(raw)
            .map_err(|e| ConfigError::env_parse_error(variable, e.to_string())),
        Some(Value::Null) | None => Ok(infer(raw)),
    }
}

/// Parse a boolean from a string.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_number(s: &str, float: bool) -> Option<Number> {
    let s = s.trim();
    if !float {
        if let Ok(n) = s.parse::<i64>() {
            return Some(n.into());
        }
        if let Ok(n) = s.parse::<u64>() {
            return Some(n.into());
        }
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// A JSON array as written, or a comma-separated list of strings.
fn parse_list(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(list @ Value::Array(_)) => list,
        _ => Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        ),
    }
}

fn infer(raw: &str) -> Value {
    if let Some(b) = parse_bool_literal(raw) {
        return Value::Bool(b);
    }
    match parse_number(raw, false) {
        Some(n) if !raw.starts_with('0') || raw.len() == 1 || raw.contains('.') => Value::Number(n),
        _ => Value::String(raw.to_string()),
    }
}

fn parse_bool_literal(s: &str) -> Option<bool> {
    match s {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tagconf_core::key::FieldTags;
    use tagconf_core::schema::{empty_defaults, no_scalar, no_schema, FieldDescriptor};
    use tagconf_core::{DefaultError, MockEnv};

    fn text() -> Scalar {
        Scalar::Text
    }

    const fn field(ident: &'static str, key: Option<&'static str>) -> FieldDescriptor {
        FieldDescriptor {
            ident,
            serde_name: ident,
            tags: FieldTags {
                key,
                yaml: None,
                json: None,
                toml: None,
            },
            exported: true,
            env_strict: false,
            default: None,
            nested: no_schema,
            kind: no_scalar,
        }
    }

    static DB_FIELDS: [FieldDescriptor; 3] = [
        field("host", None),
        field("port", None),
        FieldDescriptor {
            exported: false,
            ..field("internal", None)
        },
    ];
    fn db_defaults() -> Result<Value, DefaultError> {
        Ok(json!({"host": "localhost", "port": 3306, "internal": ""}))
    }

    static DB: Schema = Schema {
        name: "Database",
        fields: &DB_FIELDS,
        defaults: db_defaults,
    };

    fn db_schema() -> Option<&'static Schema> {
        Some(&DB)
    }

    static ROOT_FIELDS: [FieldDescriptor; 6] = [
        field("debug", None),
        FieldDescriptor {
            nested: db_schema,
            ..field("database", Some("db"))
        },
        FieldDescriptor {
            nested: db_schema,
            ..field("replica", None)
        },
        field("tags", None),
        field("ignored", Some("-")),
        FieldDescriptor {
            kind: text,
            ..field("token", None)
        },
    ];
    static ROOT: Schema = Schema {
        name: "Root",
        fields: &ROOT_FIELDS,
        defaults: empty_defaults,
    };

    fn tree() -> Map<String, Value> {
        match json!({
            "debug": false,
            "database": {"host": "localhost", "port": 3306, "internal": "x"},
            "replica": null,
            "tags": [],
            "ignored": "keep",
            "token": null,
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_overrides_use_qualified_keys() {
        let env = MockEnv::new()
            .with_var("MYAPP_DB_HOST", "192.168.1.1")
            .with_var("MYAPP_DB_PORT", "5432")
            .with_var("MYAPP_DEBUG", "true");
        let mut tree = tree();
        bind_env(&env, "myapp", &ROOT, &mut tree).unwrap();

        assert_eq!(tree["database"]["host"], "192.168.1.1");
        assert_eq!(tree["database"]["port"], 5432);
        assert_eq!(tree["debug"], true);
    }

    #[test]
    fn test_empty_and_unrelated_variables_ignored() {
        let env = MockEnv::new()
            .with_var("MYAPP_DB_HOST", "")
            .with_var("MYAPP_DATABASE_HOST", "wrong-key")
            .with_var("MYAPP_DB_INTERNAL", "private")
            .with_var("MYAPP_IGNORED", "nope");
        let mut tree = tree();
        bind_env(&env, "myapp", &ROOT, &mut tree).unwrap();
        assert_eq!(Value::Object(tree.clone()), Value::Object(self::tree()));
    }

    #[test]
    fn test_absent_block_materialized_only_when_set() {
        let mut untouched = tree();
        bind_env(&MockEnv::new(), "myapp", &ROOT, &mut untouched).unwrap();
        assert_eq!(untouched["replica"], Value::Null);

        let env = MockEnv::new().with_var("MYAPP_REPLICA_HOST", "replica-1");
        let mut tree = tree();
        bind_env(&env, "myapp", &ROOT, &mut tree).unwrap();
        assert_eq!(
            tree["replica"],
            json!({"host": "replica-1", "port": 3306, "internal": ""})
        );
    }

    #[test]
    fn test_materialized_block_coerces_by_seed() {
        let env = MockEnv::new().with_var("MYAPP_REPLICA_PORT", "6000");
        let mut tree = tree();
        bind_env(&env, "myapp", &ROOT, &mut tree).unwrap();
        assert_eq!(tree["replica"]["port"], 6000);
        assert_eq!(tree["replica"]["host"], "localhost");
    }

    #[test]
    fn test_unset_text_field_stays_string() {
        let env = MockEnv::new().with_var("MYAPP_TOKEN", "12345");
        let mut tree = tree();
        bind_env(&env, "myapp", &ROOT, &mut tree).unwrap();
        assert_eq!(tree["token"], json!("12345"));
    }

    #[test]
    fn test_coerce_by_scalar_kind() {
        assert_eq!(coerce("V", "true", Scalar::Text, None).unwrap(), json!("true"));
        assert_eq!(coerce("V", "yes", Scalar::Bool, None).unwrap(), json!(true));
        assert_eq!(coerce("V", "42", Scalar::Integer, None).unwrap(), json!(42));
        assert_eq!(coerce("V", "2", Scalar::Float, None).unwrap(), json!(2.0));
        assert!(coerce("V", "maybe", Scalar::Bool, None).is_err());
        assert_eq!(coerce("V", "7", Scalar::Other, None).unwrap(), json!(7));
    }

    #[test]
    fn test_invalid_number_reports_variable() {
        let env = MockEnv::new().with_var("MYAPP_DB_PORT", "not-a-port");
        let err = bind_env(&env, "myapp", &ROOT, &mut tree()).unwrap_err();
        assert!(err.to_string().contains("MYAPP_DB_PORT"));
    }

    #[test]
    fn test_list_values() {
        let env = MockEnv::new().with_var("MYAPP_TAGS", "a, b,c");
        let mut tree = tree();
        bind_env(&env, "myapp", &ROOT, &mut tree).unwrap();
        assert_eq!(tree["tags"], json!(["a", "b", "c"]));

        assert_eq!(parse_list("[1, 2]"), json!([1, 2]));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_infer_without_current_value() {
        assert_eq!(infer("8080"), json!(8080));
        assert_eq!(infer("0.5"), json!(0.5));
        assert_eq!(infer("true"), json!(true));
        assert_eq!(infer("0123"), json!("0123"));
        assert_eq!(infer("secret"), json!("secret"));
    }
}
