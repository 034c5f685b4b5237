//! Standard response hardening headers.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};

use crate::{AppState, config::HstsConfig};

pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let config = &state.config.server.security_headers;
    if !config.enabled {
        return next.run(request).await;
    }

    let secure = is_secure_connection(&request);
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    let hsts = (config.hsts.enabled && secure).then(|| hsts_value(&config.hsts));
    let values: [(HeaderName, Option<&str>); 5] = [
        (
            header::X_CONTENT_TYPE_OPTIONS,
            Some(config.content_type_options.as_str()),
        ),
        (header::X_FRAME_OPTIONS, config.frame_options.as_deref()),
        (
            header::CONTENT_SECURITY_POLICY,
            config.content_security_policy.as_deref(),
        ),
        (header::REFERRER_POLICY, config.referrer_policy.as_deref()),
        (header::STRICT_TRANSPORT_SECURITY, hsts.as_deref()),
    ];

    for (name, value) in values {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "Skipping invalid security header value"),
        }
    }
    response
}

fn hsts_value(config: &HstsConfig) -> String {
    let mut value = format!("max-age={}", config.max_age_secs);
    if config.include_subdomains {
        value.push_str("; includeSubDomains");
    }
    if config.preload {
        value.push_str("; preload");
    }
    value
}

/// HTTPS as seen by the client: a proxy's `X-Forwarded-Proto` or the URI scheme.
fn is_secure_connection<B>(request: &Request<B>) -> bool {
    request
        .headers()
        .get("x-forwarded-proto")
        .is_some_and(|proto| proto.as_bytes().eq_ignore_ascii_case(b"https"))
        || request
            .uri()
            .scheme_str()
            .is_some_and(|s| s.eq_ignore_ascii_case("https"))
}
