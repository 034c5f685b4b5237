use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::ErrorResponse;

#[derive(Debug)]
pub enum AuthError {
    /// No authentication credentials provided
    MissingCredentials,

    /// Credentials were provided but are invalid
    InvalidCredentials,

    /// Token signature, structure or role claim is invalid
    InvalidToken,

    /// Token has expired
    ExpiredToken,

    /// Authenticated, but the role does not allow the operation
    Forbidden(String),

    /// Internal error during authentication
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match &self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "missing_credentials",
                "Authentication credentials required",
            ),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "invalid_credentials",
                "Invalid authentication credentials",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "invalid_token",
                "Invalid authentication token",
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "expired_token",
                "Authentication token has expired",
            ),
            AuthError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                "permission_error",
                "forbidden",
                msg.as_str(),
            ),
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "Authentication internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server_error",
                    "internal_error",
                    "Internal server error",
                )
            }
        };

        let body = ErrorResponse::with_type(error_type, code, message);
        (status, Json(body)).into_response()
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Authentication credentials required"),
            AuthError::InvalidCredentials => write!(f, "Invalid authentication credentials"),
            AuthError::InvalidToken => write!(f, "Invalid authentication token"),
            AuthError::ExpiredToken => write!(f, "Authentication token has expired"),
            AuthError::Forbidden(msg) => write!(f, "Access forbidden: {}", msg),
            AuthError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Failures while minting credentials (hashing a password, signing a token).
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("token signing failed: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
