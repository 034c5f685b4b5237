use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::models::Role;

/// Request gate configuration.
///
/// ```toml
/// [gate]
/// protected_prefix = "/dashboard"
/// unmatched = "deny"
///
/// [gate.role_homes]
/// ADMIN = "/dashboard/admin"
///
/// [[gate.rules]]
/// pattern = "^/dashboard/reports(/.*)?$"
/// allow = ["ADMIN", "TEACHER"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Path prefix whose sub-paths are gated by the permission table.
    #[serde(default = "default_protected_prefix")]
    pub protected_prefix: String,

    /// Pages that redirect already signed-in callers to their dashboard.
    #[serde(default = "default_auth_entry_paths")]
    pub auth_entry_paths: Vec<String>,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_unauthorized_path")]
    pub unauthorized_path: String,

    /// Target for auth-entry redirects when the role has no home.
    #[serde(default = "default_auth_entry_fallback")]
    pub auth_entry_fallback: String,

    /// Target for protected-root redirects when the role has no home.
    #[serde(default = "default_home")]
    pub default_home: String,

    /// Landing page per role, keyed by role identifier.
    #[serde(default = "default_role_homes")]
    pub role_homes: BTreeMap<String, String>,

    /// What to do with protected sub-paths no rule matches.
    #[serde(default)]
    pub unmatched: UnmatchedPolicy,

    /// Replaces the built-in permission table when set.
    #[serde(default)]
    pub rules: Option<Vec<RuleConfig>>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            protected_prefix: default_protected_prefix(),
            auth_entry_paths: default_auth_entry_paths(),
            login_path: default_login_path(),
            unauthorized_path: default_unauthorized_path(),
            auth_entry_fallback: default_auth_entry_fallback(),
            default_home: default_home(),
            role_homes: default_role_homes(),
            unmatched: UnmatchedPolicy::default(),
            rules: None,
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.protected_prefix.as_str();
        if prefix.len() < 2 || !prefix.starts_with('/') || prefix.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "gate.protected_prefix '{}' must start with '/' and not end with '/'",
                prefix
            )));
        }

        let paths = [
            ("gate.login_path", &self.login_path),
            ("gate.unauthorized_path", &self.unauthorized_path),
            ("gate.auth_entry_fallback", &self.auth_entry_fallback),
            ("gate.default_home", &self.default_home),
        ];
        for (field, path) in paths {
            require_absolute(field, path)?;
        }
        for path in &self.auth_entry_paths {
            require_absolute("gate.auth_entry_paths", path)?;
        }

        for (role, home) in &self.role_homes {
            if Role::parse(role).is_none() {
                return Err(ConfigError::Validation(format!(
                    "gate.role_homes: unknown role '{}'",
                    role
                )));
            }
            require_absolute("gate.role_homes", home)?;
        }

        if let Some(rules) = &self.rules {
            for rule in rules {
                regex::Regex::new(&rule.pattern).map_err(|e| {
                    ConfigError::Validation(format!(
                        "gate.rules: invalid pattern '{}': {}",
                        rule.pattern, e
                    ))
                })?;
                for role in &rule.allow {
                    if Role::parse(role).is_none() {
                        return Err(ConfigError::Validation(format!(
                            "gate.rules: unknown role '{}' in rule '{}'",
                            role, rule.pattern
                        )));
                    }
                }
            }
        }

        if self.unmatched == UnmatchedPolicy::Allow {
            tracing::warn!(
                "gate.unmatched = \"allow\": protected paths without a rule are open to every signed-in role"
            );
        }
        Ok(())
    }
}

fn require_absolute(field: &str, path: &str) -> Result<(), ConfigError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{} '{}' must start with '/'",
            field, path
        )))
    }
}

/// Decision for protected sub-paths that match no permission rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Send the caller to the unauthorized page.
    #[default]
    Deny,
    /// Let any signed-in role through.
    Allow,
}

/// One entry of a custom permission table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Regular expression matched against the request path.
    pub pattern: String,
    /// Role identifiers allowed through.
    pub allow: Vec<String>,
}

fn default_protected_prefix() -> String {
    "/dashboard".to_string()
}

fn default_auth_entry_paths() -> Vec<String> {
    vec!["/login".to_string(), "/register".to_string()]
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_unauthorized_path() -> String {
    "/unauthorized".to_string()
}

fn default_auth_entry_fallback() -> String {
    "/dashboard".to_string()
}

fn default_home() -> String {
    "/dashboard/student".to_string()
}

fn default_role_homes() -> BTreeMap<String, String> {
    Role::ALL
        .iter()
        .map(|role| {
            (
                role.as_str().to_string(),
                format!("/dashboard/{}", role.as_str().to_lowercase()),
            )
        })
        .collect()
}
