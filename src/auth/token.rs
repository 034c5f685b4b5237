//! Signed credential tokens (HS256).
//!
//! The token payload is also read, unverified, by the request gate; only the
//! `role` claim matters there. Every protected operation verifies the token
//! here before trusting any claim.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use super::{AuthError, CredentialError};
use crate::{
    config::AuthConfig,
    models::{Role, User},
};

/// Claims carried in the authoritative cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Subject (user id)
    pub id: String,
    pub email: String,
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl CredentialClaims {
    /// The role claim checked against the closed role set.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), config.token_ttl_secs)
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for `user`, returning the encoded token and its claims.
    pub fn issue(&self, user: &User) -> Result<(String, CredentialClaims), CredentialError> {
        let iat = Utc::now().timestamp();
        let claims = CredentialClaims {
            id: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        self.sign(&claims).map(|token| (token, claims))
    }

    pub(crate) fn sign(&self, claims: &CredentialClaims) -> Result<String, CredentialError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Verify signature and expiry, then check the role claim.
    pub fn verify(&self, token: &str) -> Result<CredentialClaims, AuthError> {
        let data = decode::<CredentialClaims>(token, &self.decoding, &self.validation).map_err(
            |e| {
                tracing::debug!(error = %e, "Token validation failed");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                    _ => AuthError::InvalidToken,
                }
            },
        )?;

        if data.claims.role().is_none() {
            tracing::warn!(role = %data.claims.role, "Verified token carries an unknown role");
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }
}
