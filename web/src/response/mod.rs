//! Response envelopes returned by the AI and audio endpoints.

use serde::Serialize;
use utoipa::ToSchema;

pub(crate) mod ai;
pub(crate) mod audio;

/// Body returned alongside any non-2xx status from the AI and user endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
