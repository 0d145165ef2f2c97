use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::todo_service::ServiceError;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody { pub error: String }

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Todo not found")]
    NotFound,
    #[error("Origin not allowed")]
    OriginNotAllowed,
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ServiceError::NotFound(_) => ApiError::NotFound,
            ServiceError::Repository(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::OriginNotAllowed => StatusCode::FORBIDDEN,
            ApiError::Internal(source) => {
                tracing::error!(error = ?source, "database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, axum::Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
