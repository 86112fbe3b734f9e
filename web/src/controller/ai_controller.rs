use crate::params::ai::{AnalysisParams, PromptParams, SummaryQuery};
use crate::response::ai::{AnalysisResponse, PromptResponse};
use crate::{AppState, Error};
use axum::extract::{rejection::JsonRejection, Query, State};
use axum::{response::IntoResponse, Json};

use log::*;

/// POST a free-form prompt to the configured AI provider
#[utoipa::path(
    post,
    path = "/ai/prompt",
    request_body = PromptParams,
    responses(
        (status = 200, description = "Prompt processed successfully", body = PromptResponse),
        (status = 400, description = "Missing or empty prompt", body = crate::response::ErrorResponse),
        (status = 500, description = "AI API key not configured", body = crate::response::ErrorResponse),
        (status = 502, description = "The AI provider failed", body = crate::response::ErrorResponse)
    )
)]
pub async fn prompt(
    State(app_state): State<AppState>,
    payload: Result<Json<PromptParams>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(params) = payload.map_err(Error::from_rejection)?;
    params.validate()?;

    if let Some(provider) = params.provider.as_deref() {
        debug!(
            "Ignoring requested provider {provider}, using {}",
            app_state.ai_gateway.provider_kind()
        );
    }

    let response = app_state.ai_gateway.prompt(&params.prompt).await?;

    Ok(Json(PromptResponse::new(response)))
}

/// POST video content to be analyzed and summarized
#[utoipa::path(
    post,
    path = "/ai/analyze",
    request_body = AnalysisParams,
    responses(
        (status = 200, description = "Content analyzed successfully", body = AnalysisResponse),
        (status = 400, description = "Missing or empty content", body = crate::response::ErrorResponse),
        (status = 502, description = "The AI provider failed", body = crate::response::ErrorResponse)
    )
)]
pub async fn analyze(
    State(app_state): State<AppState>,
    payload: Result<Json<AnalysisParams>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(params) = payload.map_err(Error::from_rejection)?;
    params.validate()?;
    debug!(
        "Analyzing content (analysis_type: {})",
        params.analysis_type.as_deref().unwrap_or("unspecified")
    );

    let analysis = app_state.ai_gateway.analyze_content(&params.content).await?;

    Ok(Json(AnalysisResponse::analyzed(analysis)))
}

/// POST text to be summarized at the requested length
#[utoipa::path(
    post,
    path = "/ai/summarize",
    params(SummaryQuery),
    request_body = AnalysisParams,
    responses(
        (status = 200, description = "Summary generated successfully", body = AnalysisResponse),
        (status = 400, description = "Missing or empty content", body = crate::response::ErrorResponse),
        (status = 502, description = "The AI provider failed", body = crate::response::ErrorResponse)
    )
)]
pub async fn summarize(
    State(app_state): State<AppState>,
    Query(query): Query<SummaryQuery>,
    payload: Result<Json<AnalysisParams>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(params) = payload.map_err(Error::from_rejection)?;
    params.validate()?;

    let summary = app_state
        .ai_gateway
        .summarize(&params.content, query.length())
        .await?;

    Ok(Json(AnalysisResponse::summarized(summary)))
}
