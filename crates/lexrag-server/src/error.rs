use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lexrag_core::{ErrorKind, LexRagError};
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Non-standard status used when the request was cancelled before completion
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Upstream service unavailable")]
    Upstream,

    #[error("Internal server error")]
    Internal,

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Cancelled => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::REQUEST_TIMEOUT)
            }
            ServerError::Upstream => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Cancelled => "CANCELLED",
            ServerError::Upstream => "UPSTREAM_UNAVAILABLE",
            ServerError::Internal => "INTERNAL_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// Backend details are logged here and never reach the response body
impl From<LexRagError> for ServerError {
    fn from(err: LexRagError) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => ServerError::BadRequest(err.to_string()),
            ErrorKind::Cancelled => ServerError::Cancelled,
            ErrorKind::UpstreamUnavailable => {
                tracing::warn!("Upstream failure: {}", err);
                ServerError::Upstream
            }
            ErrorKind::Internal => {
                tracing::error!("Internal failure: {}", err);
                ServerError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_detail_is_hidden() {
        let err = ServerError::from(LexRagError::ModelUnavailable(
            "connect ECONNREFUSED 127.0.0.1:11434".into(),
        ));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.to_string().contains("11434"));
    }

    #[test]
    fn test_cancelled_uses_client_closed_status() {
        let err = ServerError::from(LexRagError::Cancelled);
        assert_eq!(err.status_code().as_u16(), CLIENT_CLOSED_REQUEST);
        assert_eq!(err.error_code(), "CANCELLED");
    }

    #[test]
    fn test_invalid_input_is_bad_request() {
        let err = ServerError::from(LexRagError::InvalidInput("empty text".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
