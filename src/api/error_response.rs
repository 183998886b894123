//! HTTP error response handling for the API
//!
//! Converts domain errors into JSON error bodies with matching status codes.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

/// Explicit [`ApiError`] responses carry no status of their own and default to 500
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
