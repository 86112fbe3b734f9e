use domain::ai::DEFAULT_SUMMARY_LENGTH;
use domain::error::Error as DomainError;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PromptParams {
    pub prompt: String,
    /// Accepted for compatibility; the provider is fixed when the server starts.
    #[serde(default)]
    pub provider: Option<String>,
}

impl PromptParams {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("prompt", &self.prompt)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalysisParams {
    pub content: String,
    /// Accepted for compatibility; the provider is fixed when the server starts.
    #[serde(default)]
    pub provider: Option<String>,
    /// Free form tag such as "summary" or "sentiment". Logged only.
    #[serde(default)]
    pub analysis_type: Option<String>,
}

impl AnalysisParams {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("content", &self.content)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Desired summary length, e.g. short, medium or long. Defaults to medium.
    pub length: Option<String>,
}

impl SummaryQuery {
    pub fn length(&self) -> &str {
        self.length
            .as_deref()
            .filter(|length| !length.is_empty())
            .unwrap_or(DEFAULT_SUMMARY_LENGTH)
    }
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_params_reject_blank_prompt() {
        let params: PromptParams = serde_json::from_str(r#"{"prompt": "   "}"#).unwrap();
        assert_eq!(params.validate().unwrap_err().to_string(), "prompt is required");
    }

    #[test]
    fn analysis_params_accept_optional_fields() {
        let params: AnalysisParams = serde_json::from_str(
            r#"{"content": "text", "provider": "google", "analysis_type": "sentiment"}"#,
        )
        .unwrap();
        assert!(params.validate().is_ok());
        assert_eq!(params.provider.as_deref(), Some("google"));
        assert_eq!(params.analysis_type.as_deref(), Some("sentiment"));
    }

    #[test]
    fn summary_length_defaults_to_medium() {
        assert_eq!(SummaryQuery { length: None }.length(), "medium");
        assert_eq!(SummaryQuery { length: Some(String::new()) }.length(), "medium");
        assert_eq!(SummaryQuery { length: Some("short".to_string()) }.length(), "short");
    }
}
