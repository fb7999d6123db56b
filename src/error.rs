use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;
use tracing::error;

use crate::payload::Payload;

/// Failures reported by a store adapter.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("no matching document")]
    NotFound,
    #[error("duplicate key")]
    Duplicate,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Duplicate,
            other => RepoError::Other(other.into()),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("bad request")]
    BadRequest,
    #[error("not found")]
    NotFound,
    #[error("duplicate")]
    Duplicate,
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => ServiceError::NotFound,
            RepoError::Duplicate => ServiceError::Duplicate,
            RepoError::Other(e) => ServiceError::Internal(e),
        }
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Duplicate => StatusCode::CONFLICT,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        if let ServiceError::Internal(e) = &self {
            error!(error = %e, "internal error");
        }
        Payload::fail(self.status()).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
