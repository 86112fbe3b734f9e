//! Anthropic messages API client.

use super::{
    build_client, endpoint, ensure_prompt, network_error, require_api_key, undecodable_response,
    Provider, MAX_OUTPUT_TOKENS,
};
use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use log::*;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

const PROVIDER_ID: &str = "Anthropic";

/// Model used when the gateway is configured for Anthropic.
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";

/// Messages API version pinned by this client.
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Request body for `POST /v1/messages`
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

/// A typed content block; only `text` blocks carry generated text.
#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Messages API client authenticating with the `x-api-key` header.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
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

fn api_key_header(api_key: &str) -> Result<reqwest::header::HeaderValue, Error> {
    let mut value = reqwest::header::HeaderValue::from_str(api_key).map_err(|err| {
        warn!("Failed to create {PROVIDER_ID} api key header value: {err:?}");
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config(format!(
                "Invalid {PROVIDER_ID} API key format"
            ))),
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        ensure_prompt(prompt)?;
        let api_key = require_api_key(&self.api_key, PROVIDER_ID)?;

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_OUTPUT_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let url = endpoint(&self.base_url, "/v1/messages");
        debug!("Sending prompt to {PROVIDER_ID} model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key_header(api_key)?)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| network_error(PROVIDER_ID, e))?;

        let status = response.status();
        let body = response.text().await?;

        let message: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| undecodable_response(PROVIDER_ID, status, &body, e))?;

        if let Some(error) = message.error.filter(|e| !e.message.is_empty()) {
            warn!(
                "{PROVIDER_ID} API error ({}): {}",
                error.error_type.as_deref().unwrap_or("unknown"),
                error.message
            );
            return Err(Error::remote(error.message));
        }

        let Some(block) = message.content.into_iter().next() else {
            if !status.is_success() {
                return Err(Error::remote(format!("{PROVIDER_ID} returned HTTP {status}")));
            }
            return Err(Error::empty_response(format!("no response from {PROVIDER_ID}")));
        };

        let text = match block.text.filter(|t| !t.is_empty()) {
            Some(text) if block.block_type == "text" => text,
            _ => {
                warn!(
                    "{PROVIDER_ID} first content block is a {} block without text",
                    block.block_type
                );
                return Err(Error::empty_response(format!(
                    "no text content in {PROVIDER_ID} response"
                )));
            }
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
