//! The AI gateway: one entry point for prompting whichever text-generation provider
//! this deployment is configured with.
//!
//! The provider is resolved exactly once, when the gateway is built. Every operation
//! below is a thin templating layer over [`Provider::generate`] and propagates the
//! provider's errors unchanged.

use crate::error::Error;
use crate::gateway::ai::{
    anthropic::{self, AnthropicProvider},
    google::GoogleAiProvider,
    openai::{self, OpenAiProvider},
    Provider, ProviderKind,
};
use log::*;
use secrecy::SecretString;
use service::config::{
    Config, DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_GOOGLE_BASE_URL, DEFAULT_OPENAI_BASE_URL,
};

/// Summary length used when a caller does not ask for one.
pub const DEFAULT_SUMMARY_LENGTH: &str = "medium";

/// Everything needed to build an [`AiGateway`].
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Provider identifier as configured (e.g. "openai"). Resolved case-insensitively.
    pub provider: String,
    pub api_key: Option<SecretString>,
    pub google_model: String,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub google_base_url: String,
}

impl GatewaySettings {
    /// Settings for `provider` against the public provider endpoints.
    pub fn new(provider: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            provider: provider.into(),
            api_key: api_key
                .filter(|key| !key.is_empty())
                .map(SecretString::new),
            google_model: "gemini-1.5-flash".to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            google_base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
        }
    }
}

impl From<&Config> for GatewaySettings {
    fn from(config: &Config) -> Self {
        Self {
            provider: config.ai_provider().to_string(),
            api_key: config.ai_api_key().map(SecretString::new),
            google_model: config.google_model().to_string(),
            openai_base_url: config.openai_base_url().to_string(),
            anthropic_base_url: config.anthropic_base_url().to_string(),
            google_base_url: config.google_base_url().to_string(),
        }
    }
}

pub struct AiGateway {
    kind: ProviderKind,
    has_api_key: bool,
    provider: Box<dyn Provider>,
}

impl AiGateway {
    pub fn new(config: &Config) -> Result<Self, Error> {
        Self::with_settings(GatewaySettings::from(config))
    }

    pub fn with_settings(settings: GatewaySettings) -> Result<Self, Error> {
        let kind = ProviderKind::resolve(&settings.provider);
        let has_api_key = settings.api_key.is_some();

        let provider: Box<dyn Provider> = match kind {
            ProviderKind::OpenAi => Box::new(OpenAiProvider::new(
                settings.api_key,
                openai::DEFAULT_MODEL,
                &settings.openai_base_url,
            )?),
            ProviderKind::Anthropic => Box::new(AnthropicProvider::new(
                settings.api_key,
                anthropic::DEFAULT_MODEL,
                &settings.anthropic_base_url,
            )?),
            ProviderKind::Google => Box::new(GoogleAiProvider::new(
                settings.api_key,
                settings.google_model,
                &settings.google_base_url,
            )?),
        };

        if has_api_key {
            info!(
                "AI gateway using {} with model {}",
                provider.provider_id(),
                provider.model()
            );
        } else {
            warn!(
                "AI gateway using {} without an API key; AI requests will fail",
                provider.provider_id()
            );
        }

        Ok(Self {
            kind,
            has_api_key,
            provider,
        })
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.kind
    }

    /// Sends `text` to the active provider unchanged.
    pub async fn prompt(&self, text: &str) -> Result<String, Error> {
        if !self.has_api_key {
            return Err(Error::config("AI API key not configured"));
        }
        self.provider.generate(text).await
    }

    pub async fn analyze_content(&self, content: &str) -> Result<String, Error> {
        self.prompt(&analysis_prompt(content)).await
    }

    /// `length` is free text ("short", "detailed", ...) and is passed through as-is.
    pub async fn summarize(&self, content: &str, length: &str) -> Result<String, Error> {
        self.prompt(&summary_prompt(content, length)).await
    }

    pub async fn transcribe_audio(&self, audio_path: &str) -> Result<String, Error> {
        self.prompt(&transcription_prompt(audio_path)).await
    }
}

pub fn analysis_prompt(content: &str) -> String {
    format!("Analyze the following YouTube content and provide a summary:\n\n{content}")
}

pub fn summary_prompt(content: &str, length: &str) -> String {
    format!("Generate a {length} summary of the following text:\n\n{content}")
}

pub fn transcription_prompt(audio_path: &str) -> String {
    format!("Transcribe the audio file at: {audio_path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn settings(provider: &str, api_key: Option<&str>, server_url: &str) -> GatewaySettings {
        GatewaySettings {
            provider: provider.to_string(),
            api_key: api_key.map(|k| SecretString::new(k.to_string())),
            google_model: "gemini-test".to_string(),
            openai_base_url: server_url.to_string(),
            anthropic_base_url: server_url.to_string(),
            google_base_url: server_url.to_string(),
        }
    }

    fn openai_reply(text: &str) -> String {
        json!({"choices": [{"message": {"role": "assistant", "content": text}}]}).to_string()
    }

    #[tokio::test]
    async fn unknown_provider_is_served_by_openai() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(openai_reply("from openai"))
            .expect(1)
            .create_async()
            .await;

        let gateway = AiGateway::with_settings(settings("mistral", Some("k"), &server.url()))
            .unwrap();

        assert_eq!(gateway.provider_kind(), ProviderKind::OpenAi);
        assert_eq!(gateway.prompt("Hello").await.unwrap(), "from openai");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn configured_provider_is_used() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(json!({"content": [{"type": "text", "text": "from claude"}]}).to_string())
            .expect(1)
            .create_async()
            .await;

        let gateway = AiGateway::with_settings(settings("Anthropic", Some("k"), &server.url()))
            .unwrap();

        assert_eq!(gateway.provider_kind(), ProviderKind::Anthropic);
        assert_eq!(gateway.prompt("Hello").await.unwrap(), "from claude");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn prompt_without_api_key_fails_before_calling_the_provider() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let gateway = AiGateway::with_settings(settings("google", None, &server.url())).unwrap();
        let err = gateway.summarize("some text", "short").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config(
                "AI API key not configured".to_string()
            ))
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn summary_length_only_changes_the_length_token() {
        let content = "The quick brown fox.";
        let mut server = Server::new_async().await;

        for length in ["short", "medium"] {
            let mock = server
                .mock("POST", "/v1/chat/completions")
                .match_body(Matcher::PartialJson(json!({
                    "messages": [{"role": "user", "content": summary_prompt(content, length)}]
                })))
                .with_status(200)
                .with_body(openai_reply(length))
                .expect(1)
                .create_async()
                .await;

            let gateway =
                AiGateway::with_settings(settings("openai", Some("k"), &server.url())).unwrap();
            assert_eq!(gateway.summarize(content, length).await.unwrap(), length);
            mock.assert_async().await;
            mock.remove_async().await;
        }

        assert_eq!(
            summary_prompt(content, "short").replacen("short", "medium", 1),
            summary_prompt(content, "medium")
        );
    }

    #[tokio::test]
    async fn analyze_content_wraps_content_in_the_analysis_template() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [{
                    "role": "user",
                    "content": "Analyze the following YouTube content and provide a summary:\n\nvideo transcript"
                }]
            })))
            .with_status(200)
            .with_body(openai_reply("analysis"))
            .expect(1)
            .create_async()
            .await;

        let gateway = AiGateway::with_settings(settings("openai", Some("k"), &server.url())).unwrap();

        assert_eq!(
            gateway.analyze_content("video transcript").await.unwrap(),
            "analysis"
        );
        mock.assert_async().await;
    }

    #[test]
    fn transcription_prompt_names_the_path() {
        assert_eq!(
            transcription_prompt("/tmp/a.mp3"),
            "Transcribe the audio file at: /tmp/a.mp3"
        );
    }

    #[test]
    fn settings_new_treats_empty_key_as_missing() {
        let settings = GatewaySettings::new("openai", Some(String::new()));
        assert!(settings.api_key.is_none());
        assert_eq!(settings.openai_base_url, DEFAULT_OPENAI_BASE_URL);
    }
}
