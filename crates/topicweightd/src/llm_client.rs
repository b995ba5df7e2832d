//! OpenAI-compatible LLM client.
//!
//! Structured generation uses `response_format: json_schema` in strict mode.
//! The parsed payload is still treated as untrusted: it is deserialized into
//! typed categories here and semantically normalized by the orchestrator.

use crate::config::LlmConfig;
use crate::llm_trait::{ChatResponder, StructuredGenerator};
use crate::prompts::AnalysisPrompt;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use topicweight_common::{AnalysisError, ChatMessage, GeneratedCategory, GenerationPayload};
use tracing::{debug, error, info};

/// Chat completion request body
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    analysis_model: String,
    chat_model: String,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build LLM HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            analysis_model: config.analysis_model.clone(),
            chat_model: config.chat_model.clone(),
        })
    }

    pub fn analysis_model(&self) -> &str {
        &self.analysis_model
    }

    /// POST one chat completion and return the first choice's message
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<AssistantMessage> {
        let url = format!("{}/chat/completions", self.base_url);
        let start = Instant::now();

        info!("[>]  LLM CALL [{}] ({} messages)", request.model, request.messages.len());

        let mut builder = self.http.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .context("Failed to send request to LLM provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("[-]  LLM provider error {}: {}", status, error_text);
            anyhow::bail!("LLM provider returned error {}: {}", status, error_text);
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse LLM provider response")?;

        info!("[<]  LLM RESPONSE in {}ms", start.elapsed().as_millis());

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .context("LLM provider returned no choices")
    }
}

/// Parse the structured payload text into categories
pub fn parse_generation_payload(content: &str) -> Result<Vec<GeneratedCategory>, AnalysisError> {
    serde_json::from_str::<GenerationPayload>(content)
        .map(|payload| payload.data)
        .map_err(|e| AnalysisError::Generation(format!("payload failed schema validation: {}", e)))
}

#[async_trait]
impl StructuredGenerator for OpenAiClient {
    async fn generate(
        &self,
        prompt: &AnalysisPrompt,
    ) -> Result<Vec<GeneratedCategory>, AnalysisError> {
        let messages = [
            ChatMessage::new("system", prompt.system.as_str()),
            ChatMessage::new("user", prompt.user.as_str()),
        ];
        let request = CompletionRequest {
            model: &self.analysis_model,
            messages: &messages,
            response_format: Some(json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "topic_analysis",
                    "strict": true,
                    "schema": prompt.schema()
                }
            })),
        };

        debug!("[U]  USER PROMPT ({} chars): {}", prompt.user.len(), prompt.user);

        let message = self
            .complete(&request)
            .await
            .map_err(|e| AnalysisError::Generation(format!("{:#}", e)))?;

        if let Some(refusal) = message.refusal.filter(|r| !r.is_empty()) {
            return Err(AnalysisError::Generation(format!("model refused: {}", refusal)));
        }

        let content = message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AnalysisError::Generation("no parsed payload in response".to_string()))?;

        parse_generation_payload(&content)
    }
}

#[async_trait]
impl ChatResponder for OpenAiClient {
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String, AnalysisError> {
        let request = CompletionRequest {
            model: &self.chat_model,
            messages,
            response_format: None,
        };

        let message = self
            .complete(&request)
            .await
            .map_err(|e| AnalysisError::Provider(format!("{:#}", e)))?;

        message
            .content
            .ok_or_else(|| AnalysisError::Provider("chat response had no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicweight_common::CategoryName;

    #[test]
    fn test_parse_valid_payload() {
        let content = r#"{"data":[{"name":"Social Relevance","weight":7,"facts":["a","b"],"reasoning":"r"}]}"#;
        let categories = parse_generation_payload(content).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, CategoryName::SocialRelevance);
        assert_eq!(categories[0].weight, 7.0);
        assert_eq!(categories[0].facts, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        let content = r#"{"data":[{"name":"Economic Impact","weight":7,"facts":[],"reasoning":"r"}]}"#;
        assert!(matches!(
            parse_generation_payload(content),
            Err(AnalysisError::Generation(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_data() {
        assert!(parse_generation_payload(r#"{"categories":[]}"#).is_err());
        assert!(parse_generation_payload("not json").is_err());
    }
}
