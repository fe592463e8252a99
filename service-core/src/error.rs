use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// HTTP-facing error.
///
/// Callers only ever see a static `{"error": "..."}` body. The wrapped source
/// is kept for logging and never serialized.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("{0}: {1}")]
    UpstreamError(&'static str, tonic::Status),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UpstreamError(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the HTTP caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "Invalid request",
            AppError::PayloadTooLarge(_) => "Request body too large",
            AppError::UpstreamError(message, _) => *message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.public_message().to_string(),
            }),
        )
            .into_response()
    }
}
