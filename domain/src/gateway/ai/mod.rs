//! Text-generation provider clients.
//!
//! Every provider speaks its own wire format, so each lives in its own module and
//! implements [`Provider`] independently. The AI gateway picks exactly one of them at
//! construction time through [`ProviderKind`].

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use async_trait::async_trait;
use log::*;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;

pub mod anthropic;
pub mod google;
pub mod openai;

/// Upper bound on generated tokens requested from every provider.
pub(crate) const MAX_OUTPUT_TOKENS: u32 = 1000;

/// Sampling temperature sent to the providers that accept one.
pub(crate) const TEMPERATURE: f64 = 0.7;

/// The AI providers a gateway can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Google,
    Anthropic,
}

impl ProviderKind {
    /// Returns the configuration identifier (e.g., "openai")
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Google => "google",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Resolves a configured identifier, falling back to the default provider
    /// with a warning when the identifier is not recognized.
    pub fn resolve(identifier: &str) -> Self {
        match identifier.trim().to_lowercase().as_str() {
            "openai" => ProviderKind::OpenAi,
            "google" => ProviderKind::Google,
            "anthropic" => ProviderKind::Anthropic,
            _ => {
                let fallback = ProviderKind::default();
                warn!(
                    "Unknown AI provider: {identifier}, defaulting to {}",
                    fallback.as_str()
                );
                fallback
            }
        }
    }
}

impl FromStr for ProviderKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ProviderKind::resolve(s))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single capability: send a prompt, get back generated text.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Sends `prompt` to the provider and returns the text of the first candidate.
    async fn generate(&self, prompt: &str) -> Result<String, Error>;

    /// Human readable provider name used in logs and error messages (e.g., "OpenAI").
    fn provider_id(&self) -> &str;

    /// The model requests are sent to.
    fn model(&self) -> &str;
}

/// Builds the HTTP client shared by all provider implementations. No timeout is
/// configured; a call waits for the remote service for as long as it takes.
pub(crate) fn build_client() -> Result<reqwest::Client, Error> {
    Ok(reqwest::Client::builder().use_rustls_tls().build()?)
}

pub(crate) fn ensure_prompt(prompt: &str) -> Result<(), Error> {
    if prompt.is_empty() {
        return Err(Error::validation("prompt cannot be empty"));
    }
    Ok(())
}

pub(crate) fn require_api_key<'a>(
    api_key: &'a Option<SecretString>,
    provider_id: &str,
) -> Result<&'a str, Error> {
    match api_key {
        Some(key) if !key.expose_secret().is_empty() => Ok(key.expose_secret().as_str()),
        _ => {
            warn!("{provider_id} API key not set");
            Err(Error::config(format!("{provider_id} API key not set")))
        }
    }
}

/// Maps a transport-level failure (connection refused, DNS, TLS) to a domain error.
pub(crate) fn network_error(provider_id: &str, err: reqwest::Error) -> Error {
    warn!("Failed to call {provider_id} API: {err:?}");
    Error {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
    }
}

/// Classifies a body that could not be decoded into the provider's response envelope.
/// A non-success status is the remote service failing; a success status with an
/// undecodable body is a malformed response.
pub(crate) fn undecodable_response(
    provider_id: &str,
    status: StatusCode,
    body: &str,
    err: serde_json::Error,
) -> Error {
    warn!("Failed to parse {provider_id} response ({status}): {err:?}");
    if !status.is_success() {
        return Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Remote(format!(
                "{provider_id} returned HTTP {status}: {body}"
            ))),
        };
    }
    Error {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::External(ExternalErrorKind::Other(format!(
            "Invalid response from {provider_id}"
        ))),
    }
}

/// Joins a configured base URL and an endpoint path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
