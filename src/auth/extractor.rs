use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use tower_cookies::Cookie;
use uuid::Uuid;

use super::{AuthError, CredentialClaims};
use crate::{AppState, models::Role};

/// A caller whose token passed full signature and expiry verification.
///
/// Handlers take this as an extractor; the request gate only ever routes, so
/// this is the check that actually protects data.
#[derive(Debug, Clone)]
pub struct VerifiedUser {
    pub user_id: Uuid,
    pub role: Role,
    pub claims: CredentialClaims,
}

impl VerifiedUser {
    pub fn from_claims(claims: CredentialClaims) -> Result<Self, AuthError> {
        let role = claims.role().ok_or(AuthError::InvalidToken)?;
        let user_id = Uuid::parse_str(&claims.id).map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            user_id,
            role,
            claims,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reject with 403 unless the caller holds one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), AuthError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden(format!(
                "Role {} may not perform this operation",
                self.role
            )))
        }
    }
}

impl FromRequestParts<AppState> for VerifiedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| cookie_value(&parts.headers, &state.config.auth.token_cookie.name))
            .ok_or(AuthError::MissingCredentials)?;

        let claims = state.tokens.verify(&token)?;
        Self::from_claims(claims)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Read a cookie straight from the request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn claims(role: &str) -> CredentialClaims {
        CredentialClaims {
            id: Uuid::new_v4().to_string(),
            email: "a@x.com".into(),
            role: role.into(),
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn test_require_any() {
        let user = VerifiedUser::from_claims(claims("TEACHER")).unwrap();
        assert!(user.require_any(&[Role::Admin, Role::Teacher]).is_ok());
        assert!(matches!(
            user.require_any(&[Role::Admin]),
            Err(AuthError::Forbidden(_))
        ));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_from_claims_rejects_bad_subject() {
        let mut c = claims("ADMIN");
        c.id = "not-a-uuid".into();
        assert!(matches!(
            VerifiedUser::from_claims(c),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_cookie_value_parses_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("sessionUser=abc; token=xyz.123"),
        );
        assert_eq!(cookie_value(&headers, "token").as_deref(), Some("xyz.123"));
        assert_eq!(cookie_value(&headers, "sessionUser").as_deref(), Some("abc"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
