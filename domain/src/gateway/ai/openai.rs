//! OpenAI chat completions client.

use super::{
    build_client, endpoint, ensure_prompt, network_error, require_api_key, undecodable_response,
    Provider, MAX_OUTPUT_TOKENS, TEMPERATURE,
};
use crate::error::Error;
use async_trait::async_trait;
use log::*;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

const PROVIDER_ID: &str = "OpenAI";

/// Model used when the gateway is configured for OpenAI.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body for `POST /v1/chat/completions`
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Assistant message in a choice. `content` is null on refusals and tool calls.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

/// Error object OpenAI embeds in the response body
#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Chat completions client authenticating with a bearer token.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
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
impl Provider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        ensure_prompt(prompt)?;
        let api_key = require_api_key(&self.api_key, PROVIDER_ID)?;

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let url = endpoint(&self.base_url, "/v1/chat/completions");
        debug!("Sending prompt to {PROVIDER_ID} model {}", self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| network_error(PROVIDER_ID, e))?;

        let status = response.status();
        let body = response.text().await?;

        let completion: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| undecodable_response(PROVIDER_ID, status, &body, e))?;

        if let Some(error) = completion.error.filter(|e| !e.message.is_empty()) {
            warn!(
                "{PROVIDER_ID} API error ({}): {}",
                error.error_type.as_deref().unwrap_or("unknown"),
                error.message
            );
            return Err(Error::remote(error.message));
        }

        let Some(choice) = completion.choices.into_iter().next() else {
            if !status.is_success() {
                return Err(Error::remote(format!("{PROVIDER_ID} returned HTTP {status}")));
            }
            return Err(Error::empty_response(format!("no response from {PROVIDER_ID}")));
        };

        let Some(content) = choice.message.content.filter(|c| !c.is_empty()) else {
            return Err(Error::empty_response(format!(
                "no content in {PROVIDER_ID} response"
            )));
        };

        info!("{PROVIDER_ID} API called with model: {}", self.model);
        Ok(content)
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn model(&self) -> &str {
        &self.model
    }
}
