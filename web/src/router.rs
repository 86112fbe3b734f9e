use crate::{controller::health_check_controller, params, response, AppState};
use axum::{
    routing::{get, post},
    Router,
};

use crate::controller::{ai_controller, audio_controller, user_controller};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Media Gateway API"
        ),
        paths(
            health_check_controller::health_check,
            user_controller::index,
            user_controller::create,
            ai_controller::prompt,
            ai_controller::analyze,
            ai_controller::summarize,
            audio_controller::extract,
        ),
        components(
            schemas(
                domain::users::Model,
                params::ai::PromptParams,
                params::ai::AnalysisParams,
                params::audio::ExtractAudioParams,
                response::ErrorResponse,
                response::ai::PromptResponse,
                response::ai::AnalysisResponse,
                response::audio::ExtractAudioResponse,
            )
        ),
        tags(
            (name = "media_gateway", description = "AI prompting, audio extraction and users API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(user_routes(app_state.clone()))
        .merge(ai_routes(app_state.clone()))
        .merge(audio_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users", get(user_controller::index))
        .route("/users", post(user_controller::create))
        .with_state(app_state)
}

fn ai_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/ai/prompt", post(ai_controller::prompt))
        .route("/ai/analyze", post(ai_controller::analyze))
        .route("/ai/summarize", post(ai_controller::summarize))
        .with_state(app_state)
}

fn audio_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/extract-audio", post(audio_controller::extract))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::app_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn router(scratch: &TempDir) -> Router {
        define_routes(app_state(
            "http://127.0.0.1:9",
            None,
            scratch.path().join("youtube_audio"),
            "yt-dlp".into(),
        ))
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let scratch = TempDir::new().unwrap();
        let response = router(&scratch)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"healthy");
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/users",
            "/ai/prompt",
            "/ai/analyze",
            "/ai/summarize",
            "/extract-audio",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
