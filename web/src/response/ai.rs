use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct PromptResponse {
    pub success: bool,
    pub message: String,
    pub response: String,
}

impl PromptResponse {
    pub fn new(response: String) -> Self {
        Self {
            success: true,
            message: "Prompt processed successfully".to_string(),
            response,
        }
    }
}

/// Returned by both the analyze and summarize endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub success: bool,
    pub message: String,
    pub analysis: String,
}

impl AnalysisResponse {
    pub fn analyzed(analysis: String) -> Self {
        Self {
            success: true,
            message: "Content analyzed successfully".to_string(),
            analysis,
        }
    }

    pub fn summarized(analysis: String) -> Self {
        Self {
            success: true,
            message: "Summary generated successfully".to_string(),
            analysis,
        }
    }
}
