use crate::error::status_code;
use crate::params::audio::ExtractAudioParams;
use crate::response::audio::ExtractAudioFailure;
use crate::AppState;
use axum::body::Body;
use axum::extract::{rejection::JsonRejection, State};
use axum::http::{
    header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    HeaderName, HeaderValue, Request, StatusCode,
};
use axum::response::Response;
use axum::Json;
use domain::audio::AudioExtractor;
use log::*;
use std::path::PathBuf;
use tower::ServiceExt;
use tower_http::services::ServeFile;

const CONTENT_TRANSFER_ENCODING: HeaderName = HeaderName::from_static("content-transfer-encoding");

/// POST a video URL and receive its audio track as an mp3 download
#[utoipa::path(
    post,
    path = "/extract-audio",
    request_body = ExtractAudioParams,
    responses(
        (status = 200, description = "The extracted audio as an attachment", content_type = "audio/mpeg", body = Vec<u8>),
        (status = 400, description = "Missing or malformed url", body = crate::response::audio::ExtractAudioResponse),
        (status = 500, description = "Failed to extract audio", body = crate::response::audio::ExtractAudioResponse)
    )
)]
pub async fn extract(
    State(app_state): State<AppState>,
    payload: Result<Json<ExtractAudioParams>, JsonRejection>,
) -> Result<Response, ExtractAudioFailure> {
    let Json(params) =
        payload.map_err(|rejection| ExtractAudioFailure::invalid_request(rejection.body_text()))?;

    if params.url.trim().is_empty() {
        return Err(ExtractAudioFailure::invalid_request("url is required"));
    }

    let path = app_state
        .audio_extractor
        .extract_audio(&params.url)
        .await
        .map_err(|err| {
            warn!("Audio extraction failed for {}: {err}", params.url);
            ExtractAudioFailure::new(
                status_code(&err.error_kind),
                format!("Failed to extract audio: {err}"),
            )
        })?;

    serve_and_reclaim(&app_state.audio_extractor, path).await
}

/// Streams the file at `path` as an mp3 attachment and schedules its deletion.
/// Returns as soon as the response is built; the body is streamed afterwards.
pub async fn serve_and_reclaim(
    extractor: &AudioExtractor,
    path: PathBuf,
) -> Result<Response, ExtractAudioFailure> {
    let mut file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !file_name.ends_with(".mp3") {
        file_name.push_str(".mp3");
    }

    let response = match ServeFile::new(&path)
        .oneshot(Request::new(Body::empty()))
        .await
    {
        Ok(response) => response,
        Err(never) => match never {},
    };

    // Scheduled whether or not the file could be served
    extractor.schedule_reclaim(path);

    into_attachment(response.map(Body::new), &file_name)
}

/// Adds the download headers to a successful file response.
fn into_attachment(response: Response, file_name: &str) -> Result<Response, ExtractAudioFailure> {
    let status = response.status();
    if !status.is_success() {
        warn!("Serving {file_name} failed with {status}");
        let reason = if status == StatusCode::NOT_FOUND {
            "audio file not found".to_string()
        } else {
            format!("file service responded with {status}")
        };
        return Err(ExtractAudioFailure::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to serve file: {reason}"),
        ));
    }

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .map_err(|err| {
            ExtractAudioFailure::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serve file: {err}"),
            )
        })?;

    let (mut parts, body) = response.into_parts();
    parts.headers.insert(CONTENT_DISPOSITION, disposition);
    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    parts
        .headers
        .insert(CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("binary"));

    Ok(Response::from_parts(parts, body))
}
