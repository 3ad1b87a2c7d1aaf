use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use threadline_persist::{ActionError, ErrorKind, PersistError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn kind(&self) -> ErrorKind {
        match self {
            ApiError::ThreadNotFound(_) => ErrorKind::NotFound,
            ApiError::Action(e) => e.kind(),
            ApiError::Persist(e) => e.kind(),
            ApiError::BadRequest(_) => ErrorKind::InvalidInput,
            ApiError::Internal(_) => ErrorKind::Unknown,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.kind() {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, self.to_string()),
            ErrorKind::WriteConflict => (StatusCode::CONFLICT, self.to_string()),
            ErrorKind::ConnectionFailure => {
                tracing::error!("Database unavailable: {}", self);
                (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable".to_string())
            }
            ErrorKind::Unknown => {
                tracing::error!("Internal error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
