//! Maps `DomainError` to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Error body returned by every failing `/api/v1` route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    /// Missing, malformed or unknown caller identity.
    Unauthorized(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::Domain(DomainError::invalid_argument(msg))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "unauthorized", message),
            ApiError::Domain(err) => {
                let status = match &err {
                    DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                    DomainError::InvalidArgument(_) | DomainError::InvalidState(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    DomainError::Conflict(_) => StatusCode::CONFLICT,
                    DomainError::OcrProcessing(_)
                    | DomainError::Generation(_)
                    | DomainError::Storage(_)
                    | DomainError::Internal(_) => {
                        tracing::error!(error = %err, "request failed");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.code(), err.message().to_string())
            }
        };

        let body = ApiErrorResponse {
            error: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
