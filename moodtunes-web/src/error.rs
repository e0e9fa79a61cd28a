//! Error types for moodtunes-web
//!
//! Every handler failure renders as `{"error": {"code": ..., "message": ...}}`.
//! Collaborator failures (auth, billing) carry the collaborator's own message
//! so the page can show it verbatim.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::flow::FlowError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No session, or the session has ended (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Conflict (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Rejected flow transition (409)
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// moodtunes-common error
    #[error(transparent)]
    Common(#[from] moodtunes_common::Error),
}

impl ApiError {
    pub fn not_signed_in() -> Self {
        ApiError::Unauthorized("Not signed in".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use moodtunes_common::Error as CommonError;

        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Flow(ref err) => (StatusCode::CONFLICT, "FLOW_STEP", err.to_string()),
            ApiError::Common(err) => match err {
                CommonError::Auth(msg) => (StatusCode::UNAUTHORIZED, "AUTH_ERROR", msg),
                CommonError::Billing(msg) => (StatusCode::BAD_GATEWAY, "BILLING_ERROR", msg),
                CommonError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
                CommonError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
                other @ CommonError::Lookup(_) => {
                    (StatusCode::BAD_GATEWAY, "LOOKUP_ERROR", other.to_string())
                }
                other => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR", other.to_string()),
            },
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
