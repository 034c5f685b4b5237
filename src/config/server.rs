use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

use http::{HeaderName, Method};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request body size limit in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Security headers configuration.
    #[serde(default)]
    pub security_headers: SecurityHeadersConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
            cors: CorsConfig::default(),
            security_headers: SecurityHeadersConfig::default(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MB
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Enable CORS.
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,

    /// Allowed origins. Use ["*"] for any origin (not recommended for production).
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allowed HTTP methods.
    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<String>,

    /// Allowed headers.
    #[serde(default = "default_cors_headers")]
    pub allowed_headers: Vec<String>,

    /// Whether to allow credentials (cookies) on cross-origin requests.
    #[serde(default)]
    pub allow_credentials: bool,

    /// Max age for preflight cache in seconds.
    #[serde(default = "default_cors_max_age")]
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: vec![],
            allowed_methods: default_cors_methods(),
            allowed_headers: default_cors_headers(),
            allow_credentials: false,
            max_age_secs: default_cors_max_age(),
        }
    }
}

impl CorsConfig {
    /// Build a CorsLayer from the configuration.
    ///
    /// Returns None if CORS is disabled. An empty origin list rejects every
    /// cross-origin request; `["*"]` allows any origin.
    pub fn into_layer(self) -> Option<CorsLayer> {
        if !self.enabled {
            tracing::debug!("CORS is disabled");
            return None;
        }

        let allow_origin = if self.allowed_origins.is_empty() {
            tracing::info!(
                "CORS: No allowed_origins configured - cross-origin requests will be rejected"
            );
            AllowOrigin::list(std::iter::empty::<http::HeaderValue>())
        } else if self.allowed_origins.len() == 1 && self.allowed_origins[0] == "*" {
            tracing::warn!(
                "CORS: Allowing any origin (allowed_origins = [\"*\"]). \
                 Specify allowed origins explicitly in production."
            );
            AllowOrigin::any()
        } else {
            let origins: Vec<http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!(origin = %origin, "Invalid CORS origin, skipping");
                        None
                    })
                })
                .collect();
            tracing::info!(origins = ?self.allowed_origins, "CORS: Allowing specific origins");
            AllowOrigin::list(origins)
        };

        let methods: Vec<Method> = self
            .allowed_methods
            .iter()
            .filter_map(|m| {
                m.parse().ok().or_else(|| {
                    tracing::warn!(method = %m, "Invalid CORS method, skipping");
                    None
                })
            })
            .collect();

        let headers: Vec<HeaderName> = self
            .allowed_headers
            .iter()
            .filter_map(|h| {
                h.parse().ok().or_else(|| {
                    tracing::warn!(header = %h, "Invalid CORS header, skipping");
                    None
                })
            })
            .collect();

        let mut layer = CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(AllowMethods::list(methods))
            .allow_headers(AllowHeaders::list(headers))
            .max_age(Duration::from_secs(self.max_age_secs));

        if self.allow_credentials {
            layer = layer.allow_credentials(true);
        }

        Some(layer)
    }
}

fn default_cors_enabled() -> bool {
    true
}

fn default_cors_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_cors_headers() -> Vec<String> {
    ["Content-Type", "Authorization"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_cors_max_age() -> u64 {
    86400 // 24 hours
}

/// Security headers added to every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityHeadersConfig {
    #[serde(default = "default_security_headers_enabled")]
    pub enabled: bool,

    /// X-Content-Type-Options header value. Default: "nosniff"
    #[serde(default = "default_content_type_options")]
    pub content_type_options: String,

    /// X-Frame-Options header value. Default: "DENY"
    #[serde(default = "default_frame_options")]
    pub frame_options: Option<String>,

    /// Strict-Transport-Security header configuration.
    #[serde(default)]
    pub hsts: HstsConfig,

    #[serde(default = "default_csp")]
    pub content_security_policy: Option<String>,

    /// Referrer-Policy header value.
    #[serde(default = "default_referrer_policy")]
    pub referrer_policy: Option<String>,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enabled: default_security_headers_enabled(),
            content_type_options: default_content_type_options(),
            frame_options: default_frame_options(),
            hsts: HstsConfig::default(),
            content_security_policy: default_csp(),
            referrer_policy: default_referrer_policy(),
        }
    }
}

fn default_security_headers_enabled() -> bool {
    true
}

fn default_content_type_options() -> String {
    "nosniff".to_string()
}

fn default_frame_options() -> Option<String> {
    Some("DENY".to_string())
}

/// Dashboard pages load avatars from arbitrary https origins.
fn default_csp() -> Option<String> {
    Some("default-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; object-src 'none'; base-uri 'self'; frame-ancestors 'none'".to_string())
}

fn default_referrer_policy() -> Option<String> {
    Some("strict-origin-when-cross-origin".to_string())
}

/// HTTP Strict Transport Security (HSTS) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HstsConfig {
    #[serde(default = "default_hsts_enabled")]
    pub enabled: bool,

    /// Default: 31536000 (1 year)
    #[serde(default = "default_hsts_max_age")]
    pub max_age_secs: u64,

    #[serde(default = "default_hsts_include_subdomains")]
    pub include_subdomains: bool,

    #[serde(default)]
    pub preload: bool,
}

impl Default for HstsConfig {
    fn default() -> Self {
        Self {
            enabled: default_hsts_enabled(),
            max_age_secs: default_hsts_max_age(),
            include_subdomains: default_hsts_include_subdomains(),
            preload: false,
        }
    }
}

fn default_hsts_enabled() -> bool {
    true
}

fn default_hsts_max_age() -> u64 {
    31536000 // 1 year
}

fn default_hsts_include_subdomains() -> bool {
    true
}
