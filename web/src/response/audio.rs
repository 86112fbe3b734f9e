use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Failure body of `POST /extract-audio`. A successful call returns the audio itself.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractAudioResponse {
    pub success: bool,
    pub message: String,
}

/// An extraction failure together with the status it is reported with.
#[derive(Debug)]
pub struct ExtractAudioFailure {
    pub status: StatusCode,
    pub message: String,
}

impl ExtractAudioFailure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_request(reason: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, format!("Invalid request: {reason}"))
    }
}

impl IntoResponse for ExtractAudioFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ExtractAudioResponse {
                success: false,
                message: self.message,
            }),
        )
            .into_response()
    }
}
