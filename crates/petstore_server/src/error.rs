//! Error types for the HTTP surface.
//!
//! `ApiError` is what handlers return; it maps store outcomes onto status
//! codes and `{"error": ...}` bodies. `ServerError` covers process bootstrap.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use petstore_core::db::DbError;
use petstore_core::RepoError;
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Update or delete addressed a missing id.
    #[error("Pet not found")]
    PetNotFound,

    /// Body or path parameter failed to parse, or failed validation.
    #[error("{message}")]
    BadRequest { status: StatusCode, message: String },

    /// Storage failure or other server-side fault.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::PetNotFound => StatusCode::NOT_FOUND,
            Self::BadRequest { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(message) = &self {
            error!(
                "event=http_error module=http status=error http_status={} error={}",
                status.as_u16(),
                message
            );
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => Self::PetNotFound,
            RepoError::Validation(_) | RepoError::InvalidQuery(_) => {
                Self::bad_request(value.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::BadRequest {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

/// Fatal errors raised while starting the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error("failed to open database: {0}")]
    Database(#[from] DbError),

    #[error("database schema check failed: {0}")]
    Schema(#[from] RepoError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use petstore_core::{FilterError, PetValidationError};

    #[test]
    fn test_repo_errors_map_to_status_codes() {
        assert_eq!(
            ApiError::from(RepoError::NotFound(3)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(RepoError::Validation(PetValidationError::NonFinitePrice(
                f64::NAN
            )))
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RepoError::InvalidQuery(FilterError::NonFiniteCeiling(
                f64::INFINITY
            )))
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RepoError::InvalidData("bad row".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message_matches_contract() {
        assert_eq!(ApiError::PetNotFound.to_string(), "Pet not found");
    }
}
