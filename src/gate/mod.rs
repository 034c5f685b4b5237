//! Edge request gate.
//!
//! A pure function of (path, token cookie) to a routing decision. The token
//! is decoded without verifying its signature, so a decision here is a
//! convenience for navigation, never an access grant: handlers behind the
//! gate re-verify with [`crate::auth::VerifiedUser`].

mod decode;
mod rules;

use std::collections::HashMap;

pub use decode::{decode_payload, decode_role};
pub use rules::{PermissionTable, RoutePermissionRule, RuleOutcome, sections};
#[cfg(test)]
pub(crate) use decode::tests::unsigned_token;
use url::form_urlencoded;

use crate::{
    config::{ConfigError, GateConfig, UnmatchedPolicy},
    models::Role,
};

/// What the gate wants done with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Forward unmodified.
    Allow,
    /// No resolvable identity on a protected path.
    RedirectToLogin { location: String, from: String },
    /// Send a signed-in caller to a dashboard landing page.
    RedirectToHome { location: String },
    /// Role is not allowed on the requested path.
    Unauthorized { location: String },
}

impl GateDecision {
    /// Redirect target, or `None` for [`GateDecision::Allow`].
    pub fn location(&self) -> Option<&str> {
        match self {
            GateDecision::Allow => None,
            GateDecision::RedirectToLogin { location, .. }
            | GateDecision::RedirectToHome { location }
            | GateDecision::Unauthorized { location } => Some(location),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateDecision::Allow => "allow",
            GateDecision::RedirectToLogin { .. } => "redirect_to_login",
            GateDecision::RedirectToHome { .. } => "redirect_to_home",
            GateDecision::Unauthorized { .. } => "unauthorized",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gate {
    protected_prefix: String,
    auth_entry_paths: Vec<String>,
    login_path: String,
    unauthorized_path: String,
    auth_entry_fallback: String,
    default_home: String,
    role_homes: HashMap<Role, String>,
    unmatched: UnmatchedPolicy,
    table: PermissionTable,
}

impl Gate {
    pub fn from_config(config: &GateConfig) -> Result<Self, ConfigError> {
        let prefix = config.protected_prefix.trim_end_matches('/').to_string();
        let table = match &config.rules {
            Some(rules) => PermissionTable::from_config(rules),
            None => PermissionTable::default_for(&prefix),
        }
        .map_err(|e| ConfigError::Validation(format!("gate rules: {}", e)))?;

        let role_homes = config
            .role_homes
            .iter()
            .filter_map(|(name, home)| Role::parse(name).map(|role| (role, home.clone())))
            .collect();

        tracing::debug!(
            prefix = %prefix,
            rules = table.len(),
            unmatched = ?config.unmatched,
            "Request gate configured"
        );

        Ok(Self {
            protected_prefix: prefix,
            auth_entry_paths: config.auth_entry_paths.clone(),
            login_path: config.login_path.clone(),
            unauthorized_path: config.unauthorized_path.clone(),
            auth_entry_fallback: config.auth_entry_fallback.clone(),
            default_home: config.default_home.clone(),
            role_homes,
            unmatched: config.unmatched,
            table,
        })
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// Whether `path` falls under the protected prefix on a segment boundary.
    pub fn is_protected(&self, path: &str) -> bool {
        path.strip_prefix(self.protected_prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    pub fn is_auth_entry(&self, path: &str) -> bool {
        self.auth_entry_paths.iter().any(|p| p == path)
    }

    /// Paths the gate has an opinion about; everything else is never evaluated.
    pub fn applies_to(&self, path: &str) -> bool {
        self.is_auth_entry(path) || self.is_protected(path)
    }

    pub fn home_for(&self, role: Role) -> Option<&str> {
        self.role_homes.get(&role).map(String::as_str)
    }

    /// Decide what to do with a request for `path` carrying `token_cookie`.
    pub fn evaluate(&self, path: &str, token_cookie: Option<&str>) -> GateDecision {
        let role = decode_role(token_cookie);

        if self.is_auth_entry(path) {
            return match role {
                Some(role) => GateDecision::RedirectToHome {
                    location: self
                        .home_for(role)
                        .unwrap_or(&self.auth_entry_fallback)
                        .to_string(),
                },
                None => GateDecision::Allow,
            };
        }

        if !self.is_protected(path) {
            return GateDecision::Allow;
        }

        let Some(role) = role else {
            return GateDecision::RedirectToLogin {
                location: self.login_location(path),
                from: path.to_string(),
            };
        };

        if self.is_protected_root(path) {
            return GateDecision::RedirectToHome {
                location: self.home_for(role).unwrap_or(&self.default_home).to_string(),
            };
        }

        match self.table.check(path, role) {
            RuleOutcome::Allowed => GateDecision::Allow,
            RuleOutcome::Denied { pattern } => {
                tracing::debug!(%path, %role, %pattern, "Role excluded by permission rule");
                self.unauthorized()
            }
            RuleOutcome::Unmatched => match self.unmatched {
                UnmatchedPolicy::Allow => GateDecision::Allow,
                UnmatchedPolicy::Deny => {
                    tracing::debug!(%path, %role, "No permission rule matches protected path");
                    self.unauthorized()
                }
            },
        }
    }

    fn is_protected_root(&self, path: &str) -> bool {
        path.strip_prefix(self.protected_prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest == "/")
    }

    fn unauthorized(&self) -> GateDecision {
        GateDecision::Unauthorized {
            location: self.unauthorized_path.clone(),
        }
    }

    fn login_location(&self, from: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("from", from)
            .finish();
        format!("{}?{}", self.login_path, query)
    }
}
