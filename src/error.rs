use axum::{http::StatusCode, Json};
use serde::Serialize;
use tracing::error;

/// JSON body every failed request carries: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

pub fn bad_request(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

pub fn unauthorized(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, message)
}

pub fn not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, message)
}

pub fn conflict(message: &str) -> ApiError {
    api_error(StatusCode::CONFLICT, message)
}

/// The cause stays in the logs; the caller only sees a generic message.
pub fn internal<E: std::fmt::Display>(e: E) -> ApiError {
    error!(error = %e, "internal error");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}
