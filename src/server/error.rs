//! HTTP error responses.

use crate::error::StylizeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// An error rendered as `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    /// Response status.
    pub status_code: StatusCode,
    /// Text placed in the `error` field.
    pub message: String,
}

impl ApiError {
    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::custom(StatusCode::BAD_REQUEST, message)
    }

    /// Creates an error with a specific status code.
    pub fn custom(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<StylizeError> for ApiError {
    fn from(err: StylizeError) -> Self {
        let status_code =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::custom(status_code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            tracing::error!(status = self.status_code.as_u16(), "{}", self.message);
        } else {
            tracing::warn!(status = self.status_code.as_u16(), "{}", self.message);
        }
        (self.status_code, Json(json!({ "error": self.message }))).into_response()
    }
}
