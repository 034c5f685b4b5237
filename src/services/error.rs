use thiserror::Error;

use super::UserServiceError;
use crate::db::DbError;

/// Error type shared by the school-records services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Users(#[from] UserServiceError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Map a repository `NotFound` to a named resource.
    pub fn missing(what: &'static str) -> impl FnOnce(DbError) -> ServiceError {
        move |err| match err {
            DbError::NotFound => ServiceError::NotFound(what),
            other => ServiceError::Database(other),
        }
    }
}
