//! Prompt and schema building for topic analysis and follow-up chat.

use serde_json::{json, Value};
use topicweight_common::{AnalysisRequest, BiasPreference, CategoryName};

/// Rendered input for one structured-generation call
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPrompt {
    pub system: String,
    pub user: String,
    /// Categories the model is allowed to return
    pub categories: Vec<CategoryName>,
}

impl AnalysisPrompt {
    /// JSON schema the provider must constrain its output to
    pub fn schema(&self) -> Value {
        analysis_schema(&self.categories)
    }
}

const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a political research planner. Given a topic, you evaluate how much research attention it deserves along a fixed set of categories.

=== CATEGORIES ===
- Statistical Impact: how many people are measurably affected, and how strongly.
- Social Relevance: how much the topic shapes public discourse and communities.
- Policy Impact Potential: how likely current debate is to change law or regulation.
- Personal Relevance: how much the topic matters to this specific user, judged only from their stated personal stake.

=== RULES ===
1. Return one entry per requested category, and only requested categories.
2. weight is a number from 1 (negligible) to 10 (critical).
3. facts are 2 to 4 short, concrete, verifiable statements. Each one will be used verbatim as a web search query, so avoid opinions and pronouns.
4. Personal Relevance always has an empty facts list.
5. reasoning is one or two sentences explaining the weight.
6. Answer with JSON matching the provided schema and nothing else."#;

/// Build the full analysis prompt from a validated request
pub fn build_analysis_prompt(request: &AnalysisRequest, topic: &str) -> AnalysisPrompt {
    let personal_impact = request.personal_impact();
    let categories = CategoryName::requested(personal_impact.is_some());

    let category_list = categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let user = [
        format!("Topic: {}", topic),
        format!("Categories to evaluate: {}", category_list),
        bias_instruction(request.bias()).to_string(),
        year_instruction(request.year),
        personal_impact_instruction(personal_impact),
        time_budget_instruction(request.days_per_year),
    ]
    .join("\n");

    AnalysisPrompt {
        system: ANALYSIS_SYSTEM_PROMPT.to_string(),
        user,
        categories,
    }
}

pub fn bias_instruction(bias: BiasPreference) -> &'static str {
    match bias {
        BiasPreference::Left => {
            "Perspective: frame facts and reasoning from a left-leaning (progressive) point of view."
        }
        BiasPreference::Right => {
            "Perspective: frame facts and reasoning from a right-leaning (conservative) point of view."
        }
        BiasPreference::Neutral => {
            "Perspective: stay politically neutral and present facts without partisan framing."
        }
    }
}

pub fn year_instruction(year: Option<i32>) -> String {
    match year {
        Some(year) => format!("Timeframe: focus on the situation as of {}.", year),
        None => "Timeframe: focus on the most recent information available.".to_string(),
    }
}

pub fn personal_impact_instruction(personal_impact: Option<&str>) -> String {
    match personal_impact {
        Some(text) => format!(
            "Personal stake: \"{}\". Use it to weight Personal Relevance; give reasoning but no facts for that category.",
            text
        ),
        None => "Personal stake: none given. Do not return a Personal Relevance category.".to_string(),
    }
}

pub fn time_budget_instruction(days_per_year: f64) -> String {
    format!(
        "Time budget: the user can spend {} days per year researching political topics.",
        days_per_year
    )
}

/// Strict JSON schema for `{data: [{name, weight, facts, reasoning}]}`
pub fn analysis_schema(categories: &[CategoryName]) -> Value {
    let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();

    json!({
        "type": "object",
        "properties": {
            "data": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "enum": names },
                        "weight": { "type": "number" },
                        "facts": { "type": "array", "items": { "type": "string" } },
                        "reasoning": { "type": "string" }
                    },
                    "required": ["name", "weight", "facts", "reasoning"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["data"],
        "additionalProperties": false
    })
}

/// System message for follow-up chat, seeded with the analysis summary
pub fn chat_system_prompt(analysis_context: &str) -> String {
    format!(
        "You are a research assistant helping a user plan how to study a political topic. \
         Answer follow-up questions about the analysis below. Be concise, stay factual, \
         and say so when a question goes beyond what the analysis covers.\n\n\
         === ANALYSIS ===\n{}\n=== END ANALYSIS ===",
        analysis_context
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_personal_impact() {
        let request = AnalysisRequest::new("Carbon tax", 10.0);
        let prompt = build_analysis_prompt(&request, "Carbon tax");

        assert_eq!(prompt.categories.len(), 3);
        assert!(prompt.user.starts_with("Topic: Carbon tax\n"));
        assert!(prompt.user.contains(
            "Categories to evaluate: Statistical Impact, Social Relevance, Policy Impact Potential\n"
        ));
        assert!(prompt.user.contains("stay politically neutral"));
        assert!(prompt.user.contains("most recent information"));
        assert!(prompt.user.contains("Do not return a Personal Relevance"));
        assert!(prompt.user.contains("10 days per year"));
    }

    #[test]
    fn test_prompt_with_all_preferences() {
        let mut request = AnalysisRequest::new("Rent control", 2.5);
        request.personal_impact = Some("I rent in a big city".into());
        request.bias_preference = Some("right".into());
        request.year = Some(2024);

        let prompt = build_analysis_prompt(&request, "Rent control");
        assert_eq!(prompt.categories, CategoryName::ALL.to_vec());
        assert!(prompt.user.contains("right-leaning"));
        assert!(prompt.user.contains("as of 2024"));
        assert!(prompt.user.contains("\"I rent in a big city\""));
        assert!(prompt.user.contains("2.5 days per year"));
    }

    #[test]
    fn test_schema_restricts_names_to_requested() {
        let schema = analysis_schema(&CategoryName::requested(false));
        let names = &schema["properties"]["data"]["items"]["properties"]["name"]["enum"];
        assert_eq!(names.as_array().unwrap().len(), 3);
        assert!(!names.to_string().contains("Personal Relevance"));
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn test_chat_prompt_embeds_context() {
        let prompt = chat_system_prompt("Topic: Tariffs\n29 hours recommended");
        assert!(prompt.contains("=== ANALYSIS ===\nTopic: Tariffs\n29 hours recommended\n"));
    }
}
