//! API error handling.
//!
//! Every error leaves the server inside the uniform envelope
//! `{"status": "error", "message": ...}`. Storage and backend errors are
//! logged and collapsed to a generic 500 so internals never leak.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(eventra_core::Error),
}

impl From<eventra_core::Error> for ApiError {
    fn from(err: eventra_core::Error) -> Self {
        match err {
            eventra_core::Error::Validation(msg) => ApiError::BadRequest(msg),
            eventra_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            eventra_core::Error::Forbidden(msg) => ApiError::Forbidden(msg),
            eventra_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            eventra_core::Error::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(err) => {
                error!(subsystem = "api", error = %err, "Unhandled internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "status": "error",
            "message": message,
        }));

        (status, body).into_response()
    }
}
