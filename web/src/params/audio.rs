use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtractAudioParams {
    /// Address of the video whose audio track is extracted.
    pub url: String,
}
