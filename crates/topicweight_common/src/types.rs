//! Wire types shared by the daemon and the CLI.
//!
//! All JSON field names are camelCase. Category names travel as their
//! display strings ("Statistical Impact", ...).

use crate::error::{AnalysisError, CHAT_INVALID_MESSAGE};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Categories
// ============================================================================

/// The closed set of dimensions a topic is evaluated on.
///
/// Variant order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryName {
    #[serde(rename = "Statistical Impact")]
    StatisticalImpact,
    #[serde(rename = "Social Relevance")]
    SocialRelevance,
    #[serde(rename = "Policy Impact Potential")]
    PolicyImpactPotential,
    #[serde(rename = "Personal Relevance")]
    PersonalRelevance,
}

impl CategoryName {
    /// All categories in display order
    pub const ALL: [CategoryName; 4] = [
        CategoryName::StatisticalImpact,
        CategoryName::SocialRelevance,
        CategoryName::PolicyImpactPotential,
        CategoryName::PersonalRelevance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryName::StatisticalImpact => "Statistical Impact",
            CategoryName::SocialRelevance => "Social Relevance",
            CategoryName::PolicyImpactPotential => "Policy Impact Potential",
            CategoryName::PersonalRelevance => "Personal Relevance",
        }
    }

    /// Position in the display order
    pub fn display_rank(&self) -> usize {
        *self as usize
    }

    /// Categories to request from the model.
    /// Personal Relevance is only evaluated when the user described a stake.
    pub fn requested(with_personal_impact: bool) -> Vec<CategoryName> {
        Self::ALL
            .iter()
            .copied()
            .filter(|c| with_personal_impact || *c != CategoryName::PersonalRelevance)
            .collect()
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ideological lean the analysis should take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BiasPreference {
    Left,
    Right,
    #[default]
    Neutral,
}

impl BiasPreference {
    /// Parse a request value. Unknown or missing values mean neutral.
    pub fn from_request(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("left") => BiasPreference::Left,
            Some("right") => BiasPreference::Right,
            _ => BiasPreference::Neutral,
        }
    }
}

// ============================================================================
// Analysis request / response
// ============================================================================

/// Body of `POST /calculate-weight`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub days_per_year: f64,
}

impl AnalysisRequest {
    pub fn new(topic: impl Into<String>, days_per_year: f64) -> Self {
        Self {
            topic: topic.into(),
            days_per_year,
            ..Default::default()
        }
    }

    /// Personal impact text, if present and not blank
    pub fn personal_impact(&self) -> Option<&str> {
        self.personal_impact
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn bias(&self) -> BiasPreference {
        BiasPreference::from_request(self.bias_preference.as_deref())
    }
}

/// A category as returned by the structured-generation model, before sourcing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCategory {
    pub name: CategoryName,
    pub weight: f64,
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Top-level object the model must produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationPayload {
    pub data: Vec<GeneratedCategory>,
}

/// An external reference supporting a fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_id: Option<u32>,
}

impl Source {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
            citation_id: None,
        }
    }

    /// Whether this source can be cited (has a non-blank link)
    pub fn is_citable(&self) -> bool {
        !self.link.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub text: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// A fully enriched category as returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: CategoryName,
    pub weight: f64,
    pub facts: Vec<Fact>,
    pub reasoning: String,
}

/// Entry in the response reference list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitedSource {
    pub citation: u32,
    pub source: Source,
    #[serde(default)]
    pub context: String,
}

/// Body of a successful `POST /calculate-weight`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub weights: Vec<Category>,
    pub total_hours: u32,
    pub total_hours_description: String,
    pub analysis_context: String,
    pub sources: Vec<CitedSource>,
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Body of `POST /chat`.
///
/// `conversation` stays untyped until [`ChatRequest::validate`] so a
/// non-array value can be answered with a 400 instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation: Option<serde_json::Value>,
    #[serde(default)]
    pub analysis_context: Option<String>,
}

impl ChatRequest {
    /// Check shape and return the typed conversation plus context
    pub fn validate(self) -> Result<(Vec<ChatMessage>, String), AnalysisError> {
        let invalid = || AnalysisError::Validation(CHAT_INVALID_MESSAGE.to_string());

        let context = self.analysis_context.ok_or_else(invalid)?;
        let conversation = match self.conversation {
            Some(value @ serde_json::Value::Array(_)) => {
                serde_json::from_value::<Vec<ChatMessage>>(value).map_err(|_| invalid())?
            }
            _ => return Err(invalid()),
        };

        if conversation.is_empty() {
            return Err(invalid());
        }

        Ok((conversation, context))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub ground_truth_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_name_wire_format() {
        let json = serde_json::to_string(&CategoryName::PolicyImpactPotential).unwrap();
        assert_eq!(json, "\"Policy Impact Potential\"");

        let parsed: CategoryName = serde_json::from_str("\"Personal Relevance\"").unwrap();
        assert_eq!(parsed, CategoryName::PersonalRelevance);

        assert!(serde_json::from_str::<CategoryName>("\"Economic Impact\"").is_err());
    }

    #[test]
    fn test_display_rank_follows_canonical_order() {
        let ranks: Vec<usize> = CategoryName::ALL.iter().map(|c| c.display_rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_requested_drops_personal_relevance() {
        assert_eq!(CategoryName::requested(false).len(), 3);
        assert!(!CategoryName::requested(false).contains(&CategoryName::PersonalRelevance));
        assert_eq!(CategoryName::requested(true), CategoryName::ALL.to_vec());
    }

    #[test]
    fn test_request_camel_case_and_defaults() {
        let req: AnalysisRequest = serde_json::from_value(json!({
            "topic": "Minimum wage",
            "personalImpact": "   ",
            "biasPreference": "LEFT",
            "daysPerYear": 12
        }))
        .unwrap();
        assert_eq!(req.topic, "Minimum wage");
        assert_eq!(req.personal_impact(), None);
        assert_eq!(req.bias(), BiasPreference::Left);
        assert_eq!(req.year, None);
        assert_eq!(req.days_per_year, 12.0);

        let empty: AnalysisRequest = serde_json::from_value(json!({})).unwrap();
        assert!(empty.topic.is_empty());
        assert_eq!(empty.days_per_year, 0.0);
    }

    #[test]
    fn test_unknown_bias_is_neutral() {
        assert_eq!(BiasPreference::from_request(Some("centrist")), BiasPreference::Neutral);
        assert_eq!(BiasPreference::from_request(None), BiasPreference::Neutral);
    }

    #[test]
    fn test_source_citation_id_omitted_when_unset() {
        let value = serde_json::to_value(Source::new("t", "https://a", "s")).unwrap();
        assert!(value.get("citationId").is_none());

        let mut cited = Source::new("t", "https://a", "s");
        cited.citation_id = Some(3);
        let value = serde_json::to_value(cited).unwrap();
        assert_eq!(value["citationId"], 3);
    }

    #[test]
    fn test_chat_request_validation() {
        let ok = ChatRequest {
            conversation: Some(json!([{"role": "user", "content": "why 29 hours?"}])),
            analysis_context: Some("ctx".into()),
        };
        let (conversation, context) = ok.validate().unwrap();
        assert_eq!(conversation.len(), 1);
        assert_eq!(context, "ctx");

        let not_array = ChatRequest {
            conversation: Some(json!("hello")),
            analysis_context: Some("ctx".into()),
        };
        assert!(not_array.validate().is_err());

        let empty = ChatRequest {
            conversation: Some(json!([])),
            analysis_context: Some("ctx".into()),
        };
        assert!(empty.validate().is_err());

        let no_context = ChatRequest {
            conversation: Some(json!([{"role": "user", "content": "hi"}])),
            analysis_context: None,
        };
        assert!(no_context.validate().is_err());
    }
}
