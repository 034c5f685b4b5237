use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{AuthError, CredentialError},
    db::DbError,
    services::{ServiceError, UserServiceError},
};

/// JSON error envelope: `{"error": {"type", "message", "param", "code"}}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error class, e.g. "invalid_request_error" or "authentication_error"
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub param: Option<String>,
    pub code: Option<String>,
    /// Filled in by the request id middleware.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_type("invalid_request_error", code, message)
    }

    pub fn with_type(
        error_type: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorInfo {
                error_type: error_type.into(),
                message: message.into(),
                param: None,
                code: Some(code.into()),
                request_id: None,
            },
        }
    }
}

/// Error returned by the JSON API handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Conflict(String),
    Validation(String),
    Unauthorized(String),
    Auth(AuthError),
    Internal(String),
}

impl ApiError {
    /// The message a client is shown; internal detail is withheld.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Validation(msg)
            | ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::Auth(err) => err.to_string(),
            ApiError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            DbError::Conflict(msg) => ApiError::Conflict(msg),
            DbError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::NotFound => ApiError::NotFound("User not found".to_string()),
            UserServiceError::InvalidPassword => {
                ApiError::Unauthorized("Invalid password".to_string())
            }
            UserServiceError::Validation(msg) => ApiError::Validation(msg),
            UserServiceError::Forbidden(msg) => ApiError::Auth(AuthError::Forbidden(msg)),
            UserServiceError::Database(db) => db.into(),
            UserServiceError::Credential(e) => e.into(),
            UserServiceError::Avatar(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(what) => ApiError::NotFound(what.to_string()),
            ServiceError::Validation(msg) => ApiError::Validation(msg),
            ServiceError::Forbidden(msg) => ApiError::Auth(AuthError::Forbidden(msg)),
            ServiceError::Database(db) => db.into(),
            ServiceError::Users(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            ApiError::Auth(err) => return err.into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found_error", "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "invalid_request_error", "conflict", msg),
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "validation_error",
                msg,
            ),
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "invalid_credentials",
                msg,
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server_error",
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse::with_type(error_type, code, message))).into_response()
    }
}
