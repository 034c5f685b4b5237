//! Unverified role extraction from the authoritative cookie.
//!
//! The signature is never checked here. The result is a routing hint only.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::Value;

use crate::models::Role;

/// Resolve the caller's role from a raw token cookie value.
///
/// Returns `None` (anonymous) when the cookie is absent, has no payload
/// segment, the payload is not base64 JSON, the `role` claim is missing or
/// falsy, or the normalized role is outside the role set.
///
/// A role outside the set is not kept as a "present but unprivileged"
/// caller. It is treated as no session: a `JANITOR` token on a protected
/// section is sent to the login page rather than `/unauthorized`, and the
/// auth-entry pages render instead of bouncing to the dashboard.
pub fn decode_role(cookie: Option<&str>) -> Option<Role> {
    let token = cookie.map(str::trim).filter(|t| !t.is_empty())?;

    let Some(segment) = token.split('.').nth(1).filter(|s| !s.is_empty()) else {
        tracing::debug!("Token cookie has no payload segment");
        return None;
    };

    let claims = decode_payload(segment)?;
    let normalized = Role::normalize(claims.get("role")?)?;

    match Role::parse(&normalized) {
        Some(role) => Some(role),
        None => {
            tracing::warn!(role = %normalized, "Token carries an unknown role, treating caller as anonymous");
            None
        }
    }
}

/// Decode a URL-safe base64 JSON segment, tolerating missing padding.
pub fn decode_payload(segment: &str) -> Option<Value> {
    let mut encoded = segment.replace('-', "+").replace('_', "/");
    while encoded.len() % 4 != 0 {
        encoded.push('=');
    }

    let bytes = match STANDARD.decode(encoded.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Token payload is not valid base64");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Token payload is not valid JSON");
            None
        }
    }
}
