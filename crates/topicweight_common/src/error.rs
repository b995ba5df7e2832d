//! Error types for Topic Weight.

use thiserror::Error;

pub const TOPIC_REQUIRED_MESSAGE: &str = "Topic input is required.";
pub const DAYS_INVALID_MESSAGE: &str = "Days per year must be a positive number.";
pub const DAYS_TOO_LARGE_MESSAGE: &str = "Days per year cannot exceed 366.";
pub const INVALID_BODY_MESSAGE: &str = "Request body is invalid.";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to calculate topic weight.";
pub const CHAT_INVALID_MESSAGE: &str =
    "Conversation must be a non-empty array and analysisContext is required.";
pub const CHAT_FAILED_MESSAGE: &str = "Failed to get chat response.";

/// Failures surfaced by the analysis and chat handlers.
///
/// Only `Validation` carries a message meant for the caller. The other
/// variants keep their detail for server-side logs and map to a fixed
/// generic message via [`AnalysisError::user_message`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl AnalysisError {
    /// HTTP status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::Validation(_) => 400,
            AnalysisError::Generation(_) => 500,
            AnalysisError::Provider(_) => 500,
        }
    }

    /// Message safe to show to a client
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Validation(msg) => msg.clone(),
            AnalysisError::Generation(_) => ANALYSIS_FAILED_MESSAGE.to_string(),
            AnalysisError::Provider(_) => CHAT_FAILED_MESSAGE.to_string(),
        }
    }
}
