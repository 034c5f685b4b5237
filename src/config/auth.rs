use serde::{Deserialize, Serialize};
use tower_cookies::cookie::SameSite as CookieSameSite;

use super::ConfigError;

/// Credential and cookie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC secret for signing credential tokens.
    ///
    /// Example: `jwt_secret = "${PORTAL_JWT_SECRET}"`
    #[serde(default)]
    pub jwt_secret: String,

    /// Token lifetime in seconds. Default: one week.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Minimum password length for new accounts.
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,

    /// The authoritative (httpOnly) cookie carrying the signed token.
    #[serde(default)]
    pub token_cookie: TokenCookieConfig,

    /// The advisory, script-readable cookie mirroring the signed-in user.
    #[serde(default)]
    pub session_cookie: SessionCookieConfig,

    /// Admin account created at startup when no account uses its email.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
            password_min_length: default_password_min_length(),
            token_cookie: TokenCookieConfig::default(),
            session_cookie: SessionCookieConfig::default(),
            bootstrap_admin: None,
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Validation(
                "auth.jwt_secret must be set".into(),
            ));
        }
        if self.jwt_secret.len() < 32 {
            tracing::warn!(
                length = self.jwt_secret.len(),
                "auth.jwt_secret is shorter than 32 bytes; use a longer random secret in production"
            );
        }
        if self.token_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "auth.token_ttl_secs must be greater than zero".into(),
            ));
        }
        if self.token_cookie.name.is_empty() || self.session_cookie.name.is_empty() {
            return Err(ConfigError::Validation(
                "auth cookie names must not be empty".into(),
            ));
        }
        if self.token_cookie.name == self.session_cookie.name {
            return Err(ConfigError::Validation(
                "auth.token_cookie and auth.session_cookie must use different names".into(),
            ));
        }
        if let Some(admin) = &self.bootstrap_admin
            && admin.password.chars().count() < self.password_min_length
        {
            return Err(ConfigError::Validation(format!(
                "auth.bootstrap_admin.password must be at least {} characters",
                self.password_min_length
            )));
        }
        Ok(())
    }
}

fn default_token_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_password_min_length() -> usize {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenCookieConfig {
    #[serde(default = "default_token_cookie_name")]
    pub name: String,

    /// Secure cookie (HTTPS only).
    #[serde(default = "default_true")]
    pub secure: bool,

    #[serde(default)]
    pub same_site: SameSite,
}

impl Default for TokenCookieConfig {
    fn default() -> Self {
        Self {
            name: default_token_cookie_name(),
            secure: true,
            same_site: SameSite::default(),
        }
    }
}

fn default_token_cookie_name() -> String {
    "token".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionCookieConfig {
    #[serde(default = "default_session_cookie_name")]
    pub name: String,

    /// Default: one week.
    #[serde(default = "default_token_ttl")]
    pub max_age_secs: u64,
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            name: default_session_cookie_name(),
            max_age_secs: default_token_ttl(),
        }
    }
}

fn default_session_cookie_name() -> String {
    "sessionUser".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl From<&SameSite> for CookieSameSite {
    fn from(value: &SameSite) -> Self {
        match value {
            SameSite::Strict => CookieSameSite::Strict,
            SameSite::Lax => CookieSameSite::Lax,
            SameSite::None => CookieSameSite::None,
        }
    }
}

/// Initial administrator, for deployments that start with an empty store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapAdminConfig {
    pub name: String,
    pub email: String,
    /// Example: `password = "${PORTAL_ADMIN_PASSWORD}"`
    pub password: String,
}
