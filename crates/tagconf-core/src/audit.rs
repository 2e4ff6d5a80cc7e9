//! Strict environment audit.
//!
//! In production, every field marked `env = "strict"` must be backed by a
//! non-empty environment variable, so that secrets never come from a file.
//! The audit walks a populated configuration value and checks each marked
//! leaf against the variable named by its qualified key.
//!
//! # Example
//!
//! ```
//! use tagconf_core::audit::StrictAuditor;
//! use tagconf_core::env::MockEnv;
//!
//! let env = MockEnv::new().with_var("APP_ENV", "dev");
//! let auditor = StrictAuditor::new(&env);
//!
//! // Outside production the audit never fails.
//! assert!(auditor.audit("myapp", &String::from("leaf")).is_ok());
//! ```

use tracing::debug;

use crate::env::{EnvProvider, ProcessEnv};
use crate::error::StrictEnvError;
use crate::key::Key;
use crate::path::compose;
use crate::schema::{Node, NodeRef};

/// Walks configuration values and checks strict fields against an environment.
#[derive(Debug, Clone, Copy)]
pub struct StrictAuditor<E> {
    env: E,
}

impl<E: EnvProvider> StrictAuditor<E> {
    /// Create an auditor reading from `env`.
    pub fn new(env: E) -> Self {
        Self { env }
    }

    /// Audits `config` with `app_name` as the key prefix.
    ///
    /// Returns `Ok` without walking anything unless the deployment mode is
    /// production. The mode is read on every call. The walk stops at the
    /// first violation.
    pub fn audit<T: Node + ?Sized>(&self, app_name: &str, config: &T) -> Result<(), StrictEnvError> {
        if !self.env.is_production() {
            debug!(app_name, "not in production, strict environment audit skipped");
            return Ok(());
        }

        self.walk(app_name, config.node())
    }

    fn walk(&self, prefix: &str, node: NodeRef<'_>) -> Result<(), StrictEnvError> {
        let record = match node {
            NodeRef::Record(record) => record,
            NodeRef::Absent => {
                debug!(prefix, "optional block not set, skipping");
                return Ok(());
            }
            NodeRef::Leaf => return Ok(()),
        };

        let fields = record.record_schema().fields;
        for (field, value) in fields.iter().zip(record.field_nodes()) {
            if !field.exported {
                continue;
            }

            let key = match field.key() {
                Key::Named(key) => key,
                Key::Ignored => continue,
            };

            let qualified = compose(prefix, key);

            if matches!(value, NodeRef::Record(_) | NodeRef::Absent) {
                self.walk(&qualified, value)?;
                continue;
            }

            if field.env_strict && self.env.var(&qualified).map_or(true, |v| v.is_empty()) {
                return Err(StrictEnvError::new(field.ident, key, qualified));
            }
        }

        Ok(())
    }
}

/// Audits `config` against the process environment.
pub fn check_env_strict<T: Node + ?Sized>(app_name: &str, config: &T) -> Result<(), StrictEnvError> {
    StrictAuditor::new(ProcessEnv).audit(app_name, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;
    use crate::key::FieldTags;
    use crate::schema::{empty_defaults, no_scalar, no_schema, FieldDescriptor, Record, Schema};

    const fn field(ident: &'static str, key: Option<&'static str>, env_strict: bool) -> FieldDescriptor {
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
            env_strict,
            default: None,
            nested: no_schema,
            kind: no_scalar,
        }
    }

    // StrictSub { api_key (strict) }
    static SUB_FIELDS: [FieldDescriptor; 1] = [field("api_key", Some("api_key"), true)];
    static SUB: Schema = Schema {
        name: "StrictSub",
        fields: &SUB_FIELDS,
        defaults: empty_defaults,
    };

    struct StrictSub;

    impl Node for StrictSub {
        fn schema() -> Option<&'static Schema> {
            Some(&SUB)
        }

        fn node(&self) -> NodeRef<'_> {
            NodeRef::Record(self)
        }
    }

    impl Record for StrictSub {
        fn record_schema(&self) -> &'static Schema {
            &SUB
        }

        fn field_nodes(&self) -> Vec<NodeRef<'_>> {
            vec![NodeRef::Leaf]
        }
    }

    fn sub_schema() -> Option<&'static Schema> {
        Some(&SUB)
    }

    // StrictConfig { password (strict, "password,omitempty"), sub: Option<StrictSub>,
    //                hidden (private, strict), skipped (ignored, strict) }
    static ROOT_FIELDS: [FieldDescriptor; 4] = [
        field("password", Some("password,omitempty"), true),
        FieldDescriptor {
            nested: sub_schema,
            ..field("sub", Some("sub"), false)
        },
        FieldDescriptor {
            exported: false,
            ..field("hidden", None, true)
        },
        field("skipped", Some("-"), true),
    ];
    static ROOT: Schema = Schema {
        name: "StrictConfig",
        fields: &ROOT_FIELDS,
        defaults: empty_defaults,
    };

    struct StrictConfig {
        sub: Option<StrictSub>,
    }

    impl Node for StrictConfig {
        fn schema() -> Option<&'static Schema> {
            Some(&ROOT)
        }

        fn node(&self) -> NodeRef<'_> {
            NodeRef::Record(self)
        }
    }

    impl Record for StrictConfig {
        fn record_schema(&self) -> &'static Schema {
            &ROOT
        }

        fn field_nodes(&self) -> Vec<NodeRef<'_>> {
            vec![NodeRef::Leaf, self.sub.node(), NodeRef::Leaf, NodeRef::Leaf]
        }
    }

    #[test]
    fn test_missing_variable_in_production() {
        let env = MockEnv::production();
        let cfg = StrictConfig { sub: None };

        let err = StrictAuditor::new(&env).audit("myapp", &cfg).unwrap_err();
        assert_eq!(err.variable, "MYAPP_PASSWORD");
        assert_eq!(err.key, "password");
        assert_eq!(err.field, "password");
        assert!(err.to_string().contains("MYAPP_PASSWORD"));
        assert!(!err.to_string().contains("OMITEMPTY"));
    }

    #[test]
    fn test_variable_present_in_production() {
        let env = MockEnv::production().with_var("MYAPP_PASSWORD", "secret");
        let cfg = StrictConfig { sub: None };
        assert!(StrictAuditor::new(&env).audit("myapp", &cfg).is_ok());
    }

    #[test]
    fn test_empty_variable_is_missing() {
        let env = MockEnv::production().with_var("MYAPP_PASSWORD", "");
        let cfg = StrictConfig { sub: None };
        assert!(StrictAuditor::new(&env).audit("myapp", &cfg).is_err());
    }

    #[test]
    fn test_dev_mode_skips_audit() {
        let env = MockEnv::new().with_var("APP_ENV", "dev");
        let cfg = StrictConfig {
            sub: Some(StrictSub),
        };
        assert!(StrictAuditor::new(&env).audit("myapp", &cfg).is_ok());
    }

    #[test]
    fn test_absent_nested_block_is_skipped() {
        let env = MockEnv::production().with_var("MYAPP_PASSWORD", "pass");
        let cfg = StrictConfig { sub: None };
        assert!(StrictAuditor::new(&env).audit("myapp", &cfg).is_ok());
    }

    #[test]
    fn test_present_nested_block_is_checked() {
        let env = MockEnv::production().with_var("MYAPP_PASSWORD", "pass");
        let cfg = StrictConfig {
            sub: Some(StrictSub),
        };

        let err = StrictAuditor::new(&env).audit("myapp", &cfg).unwrap_err();
        assert_eq!(err.variable, "MYAPP_SUB_API_KEY");
        assert_eq!(err.field, "api_key");

        let env = env.with_var("MYAPP_SUB_API_KEY", "key");
        assert!(StrictAuditor::new(&env).audit("myapp", &cfg).is_ok());
    }

    #[test]
    fn test_first_violation_short_circuits() {
        let env = MockEnv::production();
        let cfg = StrictConfig {
            sub: Some(StrictSub),
        };

        // Both MYAPP_PASSWORD and MYAPP_SUB_API_KEY are missing; only the
        // first in declaration order is reported.
        let err = StrictAuditor::new(&env).audit("myapp", &cfg).unwrap_err();
        assert_eq!(err.variable, "MYAPP_PASSWORD");
    }

    #[test]
    fn test_empty_app_name() {
        let env = MockEnv::production();
        let cfg = StrictConfig { sub: None };
        let err = StrictAuditor::new(&env).audit("", &cfg).unwrap_err();
        assert_eq!(err.variable, "PASSWORD");
    }

    #[test]
    fn test_mode_is_read_per_call() {
        let mut env = MockEnv::new().with_var("APP_ENV", "dev");
        let cfg = StrictConfig { sub: None };
        assert!(StrictAuditor::new(&env).audit("myapp", &cfg).is_ok());

        env.set("APP_ENV", "PROD");
        assert!(StrictAuditor::new(&env).audit("myapp", &cfg).is_err());
    }

    #[test]
    fn test_absent_root_is_skipped() {
        let env = MockEnv::production();
        let cfg: Option<StrictConfig> = None;
        assert!(StrictAuditor::new(&env).audit("myapp", &cfg).is_ok());
    }
}
