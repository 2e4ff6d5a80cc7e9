//! Integration tests for the `Config` derive.
//!
//! These tests check the generated schema and instance walk, and run the
//! strict environment audit against derived types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tagconf::{
    check_env_strict, BoxError, Config, Key, MockEnv, Node, NodeRef, Record, Scalar,
    SelfValidate, StrictAuditor, Validator,
};
use validator::Validate;

#[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
pub struct StrictSub {
    #[config(env = "strict")]
    pub api_key: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
pub struct StrictConfig {
    #[config(key = "password,omitempty", env = "strict")]
    pub password: String,
    pub sub: Option<Box<StrictSub>>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
pub struct Tagged {
    #[config(key = "user_name", yaml = "u", json = "user")]
    pub username: String,
    #[config(key = "-", yaml = "role")]
    pub role: String,
    #[config(key = "", toml = "db_port")]
    pub port: u16,
    #[serde(rename = "listenAddr")]
    #[config(key = "listen_addr", default = "0.0.0.0:8080")]
    pub addr: String,
    #[config(default = "5")]
    pub retries: Option<u32>,
    pub(crate) scope: String,
    #[config(env = "strict")]
    hidden: String,
    pub r#type: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
pub struct Logging {
    #[config(leaf)]
    pub format: LogFormat,
    #[config(default = "true")]
    pub enabled: bool,
    pub flush: Duration,
}

#[test]
fn test_schema_describes_fields() {
    let schema = Tagged::config_schema();
    assert_eq!(schema.name, "Tagged");
    assert_eq!(schema.fields.len(), 8);

    let keys: Vec<_> = schema.fields.iter().map(|f| f.key()).collect();
    assert_eq!(
        keys,
        vec![
            Key::Named("user_name"),
            Key::Ignored,
            Key::Named("db_port"),
            Key::Named("listen_addr"),
            Key::Named("retries"),
            Key::Named("scope"),
            Key::Named("hidden"),
            Key::Named("type"),
        ]
    );

    let addr = &schema.fields[3];
    assert_eq!(addr.ident, "addr");
    assert_eq!(addr.serde_name, "listenAddr");
    assert_eq!(addr.default, Some("0.0.0.0:8080"));

    assert!(schema.fields[5].exported);
    assert!(!schema.fields[6].exported);
    assert!(schema.fields[6].env_strict);
    assert_eq!(schema.fields[1].display_name(), "role");
    assert!(schema.fields.iter().all(|f| f.nested_schema().is_none()));

    assert_eq!(schema.fields[0].scalar(), Scalar::Text);
    assert_eq!(schema.fields[2].scalar(), Scalar::Integer);
    assert_eq!(schema.fields[4].scalar(), Scalar::Integer);
}

#[test]
fn test_nested_schema_through_wrappers() {
    let schema = StrictConfig::config_schema();
    let sub = schema.field("sub").unwrap();
    assert_eq!(sub.nested_schema().map(|s| s.name), Some("StrictSub"));
    assert_eq!(
        <StrictConfig as Node>::schema().map(|s| s.name),
        Some("StrictConfig")
    );
}

#[test]
fn test_apply_defaults() {
    let mut tagged = Tagged::default();
    Node::apply_defaults(&mut tagged).unwrap();
    assert_eq!(tagged.addr, "0.0.0.0:8080");
    assert_eq!(tagged.retries, Some(5));
    assert_eq!(tagged.port, 0);

    let mut logging = Logging::default();
    Node::apply_defaults(&mut logging).unwrap();
    assert!(logging.enabled);
    assert_eq!(logging.format, LogFormat::Json);
}

#[test]
fn test_field_nodes() {
    let absent = StrictConfig::default();
    let nodes = absent.field_nodes();
    assert!(matches!(nodes[0], NodeRef::Leaf));
    assert!(matches!(nodes[1], NodeRef::Absent));

    let present = StrictConfig {
        sub: Some(Box::new(StrictSub::default())),
        ..StrictConfig::default()
    };
    match present.field_nodes()[1] {
        NodeRef::Record(record) => assert_eq!(record.record_schema().name, "StrictSub"),
        other => panic!("expected record, got {other:?}"),
    }
    assert!(matches!(present.node(), NodeRef::Record(_)));
}

#[test]
fn test_default_tree() {
    let tree = Tagged::config_schema().default_tree().unwrap();
    assert_eq!(tree["listenAddr"], "0.0.0.0:8080");
    assert_eq!(tree["retries"], 5);

    let tree = StrictConfig::config_schema().default_tree().unwrap();
    assert_eq!(tree["sub"], serde_json::Value::Null);
}

#[test]
fn test_leaf_attribute() {
    let schema = Logging::config_schema();
    assert!(schema.field("format").unwrap().nested_schema().is_none());
    assert_eq!(schema.field("format").unwrap().scalar(), Scalar::Other);
    assert_eq!(schema.field("enabled").unwrap().scalar(), Scalar::Bool);
    assert!(Logging::default()
        .field_nodes()
        .iter()
        .all(|node| matches!(node, NodeRef::Leaf)));
}

// Strict audit over derived types

#[test]
fn test_strict_missing_password() {
    let env = MockEnv::production();
    let cfg = StrictConfig {
        password: String::new(),
        sub: Some(Box::new(StrictSub {
            api_key: "123".to_string(),
        })),
    };

    let err = StrictAuditor::new(&env).audit("myapp", &cfg).unwrap_err();
    assert_eq!(err.variable, "MYAPP_PASSWORD");
    assert_eq!(err.key, "password");
    assert!(!err.to_string().contains("OMITEMPTY"));
}

#[test]
fn test_strict_missing_nested_key() {
    let env = MockEnv::production().with_var("MYAPP_PASSWORD", "pass");
    let cfg = StrictConfig {
        password: "pass".to_string(),
        sub: Some(Box::new(StrictSub::default())),
    };

    let err = StrictAuditor::new(&env).audit("myapp", &cfg).unwrap_err();
    assert_eq!(err.variable, "MYAPP_SUB_API_KEY");
    assert_eq!(err.field, "api_key");
}

#[test]
fn test_strict_absent_nested_block_skipped() {
    let env = MockEnv::production().with_var("MYAPP_PASSWORD", "pass");
    let cfg = StrictConfig {
        password: String::new(),
        sub: None,
    };

    assert!(StrictAuditor::new(&env).audit("myapp", &cfg).is_ok());
}

#[test]
fn test_strict_private_field_not_checked() {
    let env = MockEnv::production();
    assert!(StrictAuditor::new(&env)
        .audit("myapp", &Tagged::default())
        .is_ok());
}

#[test]
fn test_strict_outside_production() {
    let env = MockEnv::new().with_var("RUST_ENV", "staging");
    assert!(StrictAuditor::new(&env)
        .audit("myapp", &StrictConfig::default())
        .is_ok());
}

#[test]
fn test_check_env_strict_with_unique_prefix() {
    // Only meaningful when the test process itself is not in production.
    let cfg = StrictConfig::default();
    let result = check_env_strict("tagconf_derive_test_prefix", &cfg);
    if std::env::var("APP_ENV").is_err() && std::env::var("RUST_ENV").is_err() {
        assert!(result.is_ok());
    }
}

// Validation naming over derived types

#[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
pub struct Server {
    #[config(yaml = "listen_port")]
    #[validate(range(min = 1024))]
    pub port: u16,
    #[config(json = "-")]
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(nested)]
    pub upstreams: Vec<Upstream>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
pub struct Upstream {
    #[config(key = "upstream_url")]
    #[validate(url)]
    pub url: String,
}

#[test]
fn test_validation_names_follow_keys() {
    let server = Server {
        port: 80,
        name: String::new(),
        upstreams: vec![
            Upstream {
                url: "http://ok.example".to_string(),
            },
            Upstream {
                url: "not a url".to_string(),
            },
        ],
    };

    let err = Validator::new(None).validate(&server).unwrap_err();
    let failure = err.failure().unwrap();

    assert_eq!(failure.get("listen_port"), Some("range(min=1024)"));
    assert_eq!(failure.get("name"), Some("length(min=1)"));
    assert_eq!(failure.get("upstreams[1].url"), Some("url"));
    assert_eq!(failure.len(), 3);
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
#[config(self_validate)]
pub struct Token {
    #[validate(length(min = 64))]
    pub value: String,
}

impl SelfValidate for Token {
    fn check(&self) -> Result<(), BoxError> {
        if self.value.is_empty() {
            return Err("token value is empty".into());
        }
        Ok(())
    }
}

#[test]
fn test_self_validating_derive() {
    let token = Token {
        value: "short".to_string(),
    };
    assert!(token.self_validating().is_some());
    assert!(Validator::new(None).validate(&token).is_ok());

    // Both capabilities stay callable as methods.
    assert!(token.check().is_ok());
    assert!(token.validate().is_err());

    let err = Validator::new(None)
        .validate(&Token::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "token value is empty");

    assert!(Server::default().self_validating().is_none());
}
