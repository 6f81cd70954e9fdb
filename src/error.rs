//! Errors surfaced over HTTP.
//!
//! Preview problems are not in here: an unsupported extension or a broken
//! archive is rendered on the affected card instead of failing a request.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("download not found or already released")]
    TicketNotFound,

    #[error("card {0} has no editable text")]
    NotTextCard(String),

    #[error("invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("filename {0:?} contains control characters")]
    InvalidFilename(String),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::CardNotFound(_) | Self::TicketNotFound => StatusCode::NOT_FOUND,
            Self::NotTextCard(_) => StatusCode::CONFLICT,
            Self::Multipart(err) => err.status(),
            Self::InvalidFilename(_) => StatusCode::BAD_REQUEST,
            Self::InvalidBody(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
