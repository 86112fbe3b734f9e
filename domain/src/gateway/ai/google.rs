//! Google Generative Language (`generateContent`) client.

use super::{
    build_client, endpoint, ensure_prompt, network_error, require_api_key, undecodable_response,
    Provider, MAX_OUTPUT_TOKENS, TEMPERATURE,
};
use crate::error::Error;
use async_trait::async_trait;
use log::*;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

const PROVIDER_ID: &str = "Google AI";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

/// Request body for `POST /v1/models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    // Absent when a candidate was blocked
    #[serde(default)]
    pub content: Content,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Generative Language client; the API key travels as the `key` query parameter.
pub struct GoogleAiProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
}

impl GoogleAiProvider {
    pub fn new(
        api_key: Option<SecretString>,
        model: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            client: build_client()?,
            api_key,
            model: model.into(),
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl Provider for GoogleAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        ensure_prompt(prompt)?;
        let api_key = require_api_key(&self.api_key, PROVIDER_ID)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let url = endpoint(
            &self.base_url,
            &format!("/v1/models/{}:generateContent", self.model),
        );
        debug!("Sending prompt to {PROVIDER_ID} model {}", self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| network_error(PROVIDER_ID, e))?;

        let status = response.status();
        let body = response.text().await?;

        let generated: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| undecodable_response(PROVIDER_ID, status, &body, e))?;

        if let Some(error) = generated.error.filter(|e| !e.message.is_empty()) {
            warn!(
                "{PROVIDER_ID} error (code {}): {}",
                error.code.unwrap_or_default(),
                error.message
            );
            return Err(Error::remote(error.message));
        }

        let Some(candidate) = generated.candidates.into_iter().next() else {
            if !status.is_success() {
                return Err(Error::remote(format!("{PROVIDER_ID} returned HTTP {status}")));
            }
            return Err(Error::empty_response(format!("no response from {PROVIDER_ID}")));
        };

        let Some(text) = candidate
            .content
            .parts
            .into_iter()
            .next()
            .and_then(|part| part.text)
            .filter(|text| !text.is_empty())
        else {
            return Err(Error::empty_response(format!(
                "no content in {PROVIDER_ID} response"
            )));
        };

        info!("{PROVIDER_ID} API called with model: {}", self.model);
        Ok(text)
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, ExternalErrorKind, InternalErrorKind};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn provider(server_url: &str, api_key: Option<&str>) -> GoogleAiProvider {
        GoogleAiProvider::new(
            api_key.map(|k| SecretString::new(k.to_string())),
            "gemini-test",
            server_url,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_first_candidate_part() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/models/gemini-test:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::Json(json!({
                "contents": [{"parts": [{"text": "Hello"}]}],
                "generationConfig": {"temperature": 0.7, "maxOutputTokens": 1000}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [
                        {"content": {"parts": [{"text": "Hi from Gemini"}, {"text": "more"}], "role": "model"}},
                        {"content": {"parts": [{"text": "other candidate"}]}}
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let result = provider(&server.url(), Some("test-key"))
            .generate("Hello")
            .await;

        assert_eq!(result.unwrap(), "Hi from Gemini");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_prompt_without_network_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = provider(&server.url(), Some("test-key"))
            .generate("")
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_requires_api_key_without_network_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = provider(&server.url(), None)
            .generate("Hello")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config(
                "Google AI API key not set".to_string()
            ))
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_embedded_error_in_ok_response_is_remote_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/models/gemini-test:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = provider(&server.url(), Some("test-key"))
            .generate("Hello")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Remote(
                "API key not valid. Please pass a valid API key.".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_empty_candidates_is_empty_response_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/models/gemini-test:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"candidates": []}).to_string())
            .create_async()
            .await;

        let err = provider(&server.url(), Some("test-key"))
            .generate("Hello")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::EmptyResponse(
                "no response from Google AI".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_candidate_without_parts_is_empty_response_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/models/gemini-test:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"candidates": [{"finishReason": "SAFETY"}]}).to_string())
            .create_async()
            .await;

        let err = provider(&server.url(), Some("test-key"))
            .generate("Hello")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::EmptyResponse(
                "no content in Google AI response".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_part_without_text_is_empty_response_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/models/gemini-test:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"parts": [{"text": ""}], "role": "model"},
                        "finishReason": "STOP"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = provider(&server.url(), Some("test-key"))
            .generate("Hello")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::EmptyResponse(
                "no content in Google AI response".to_string()
            ))
        );
    }
}
