//! Analysis Orchestration
//!
//! validate -> prompt -> generate -> normalize/order -> enrich -> aggregate
//!
//! Invariants:
//! - Validation failures return before any provider call
//! - Exactly one generation call per request, no retry
//! - Response categories are in canonical display order
//! - Generation output is untrusted and normalized before use

use crate::enrichment::CategoryEnrichmentPipeline;
use crate::ground_truth::GroundTruthLookup;
use crate::llm_trait::StructuredGenerator;
use crate::prompts::build_analysis_prompt;
use crate::search::FactSourceResolver;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use topicweight_common::{
    aggregate_hours, AnalysisError, AnalysisRequest, AnalysisResponse, Category, CategoryName,
    GeneratedCategory, DAYS_INVALID_MESSAGE, DAYS_TOO_LARGE_MESSAGE, MAX_DAYS_PER_YEAR,
    TOPIC_REQUIRED_MESSAGE,
};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

const MIN_WEIGHT: f64 = 1.0;
const MAX_WEIGHT: f64 = 10.0;

pub struct AnalysisOrchestrator {
    generator: Arc<dyn StructuredGenerator>,
    pipeline: CategoryEnrichmentPipeline,
    timeout: Option<Duration>,
}

impl AnalysisOrchestrator {
    pub fn new(
        generator: Arc<dyn StructuredGenerator>,
        resolver: Arc<dyn FactSourceResolver>,
        ground_truth: Arc<dyn GroundTruthLookup>,
    ) -> Self {
        Self {
            generator,
            pipeline: CategoryEnrichmentPipeline::new(resolver, ground_truth),
            timeout: None,
        }
    }

    /// Bound generation + enrichment; in-flight lookups are dropped on expiry
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn ground_truth_enabled(&self) -> bool {
        self.pipeline.ground_truth_enabled()
    }

    pub async fn handle(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisResponse, AnalysisError> {
        let span = info_span!("analysis", request_id = %Uuid::new_v4());
        async move {
            let topic = validate_request(&request)?;
            let start = Instant::now();

            let result = match self.timeout {
                Some(limit) => tokio::time::timeout(limit, self.run(&request, &topic))
                    .await
                    .unwrap_or_else(|_| {
                        Err(AnalysisError::Generation(format!(
                            "analysis timed out after {}s",
                            limit.as_secs()
                        )))
                    }),
                None => self.run(&request, &topic).await,
            };

            match &result {
                Ok(response) => info!(
                    "Analysis of '{}' complete in {}ms: {} hours, {} sources",
                    topic,
                    start.elapsed().as_millis(),
                    response.total_hours,
                    response.sources.len()
                ),
                Err(e) => error!("Analysis of '{}' failed: {}", topic, e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        request: &AnalysisRequest,
        topic: &str,
    ) -> Result<AnalysisResponse, AnalysisError> {
        let prompt = build_analysis_prompt(request, topic);

        let generated = self.generator.generate(&prompt).await?;
        let categories = normalize_categories(generated, &prompt.categories)?;

        let enriched = self.pipeline.enrich(categories, request.year).await;
        let estimate = aggregate_hours(&enriched.categories, request.days_per_year);
        let analysis_context =
            build_analysis_context(topic, &estimate.description, &enriched.categories);

        Ok(AnalysisResponse {
            weights: enriched.categories,
            total_hours: estimate.total_hours,
            total_hours_description: estimate.description,
            analysis_context,
            sources: enriched.sources,
        })
    }
}

/// Check the request and return the trimmed topic
pub fn validate_request(request: &AnalysisRequest) -> Result<String, AnalysisError> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(AnalysisError::Validation(TOPIC_REQUIRED_MESSAGE.to_string()));
    }
    if !request.days_per_year.is_finite() || request.days_per_year <= 0.0 {
        return Err(AnalysisError::Validation(DAYS_INVALID_MESSAGE.to_string()));
    }
    if request.days_per_year > MAX_DAYS_PER_YEAR {
        return Err(AnalysisError::Validation(DAYS_TOO_LARGE_MESSAGE.to_string()));
    }
    Ok(topic.to_string())
}

/// Enforce the category contract on model output and sort into display order.
///
/// Unrequested or duplicate categories are dropped (first occurrence wins),
/// weights are clamped to 1..=10, Personal Relevance loses any facts, and
/// blank facts are removed. Empty reasoning, an empty result, or a missing
/// Personal Relevance when it was requested is an error. Other missing
/// categories are logged.
pub fn normalize_categories(
    generated: Vec<GeneratedCategory>,
    requested: &[CategoryName],
) -> Result<Vec<GeneratedCategory>, AnalysisError> {
    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(generated.len());

    for mut category in generated {
        if !requested.contains(&category.name) {
            warn!("Dropping unrequested category '{}'", category.name);
            continue;
        }
        if !seen.insert(category.name) {
            warn!("Dropping duplicate category '{}'", category.name);
            continue;
        }
        if category.reasoning.trim().is_empty() {
            return Err(AnalysisError::Generation(format!(
                "category '{}' has no reasoning",
                category.name
            )));
        }
        if !category.weight.is_finite() {
            return Err(AnalysisError::Generation(format!(
                "category '{}' has a non-numeric weight",
                category.name
            )));
        }
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&category.weight) {
            warn!(
                "Clamping weight {} for '{}' into {}..={}",
                category.weight, category.name, MIN_WEIGHT, MAX_WEIGHT
            );
            category.weight = category.weight.clamp(MIN_WEIGHT, MAX_WEIGHT);
        }

        if category.name == CategoryName::PersonalRelevance {
            if !category.facts.is_empty() {
                warn!("Clearing {} facts from Personal Relevance", category.facts.len());
            }
            category.facts.clear();
        } else {
            category.facts.retain(|f| !f.trim().is_empty());
        }

        categories.push(category);
    }

    if categories.is_empty() {
        return Err(AnalysisError::Generation(
            "model returned no usable categories".to_string(),
        ));
    }

    for name in requested.iter().filter(|n| !seen.contains(*n)) {
        if *name == CategoryName::PersonalRelevance {
            return Err(AnalysisError::Generation(
                "model omitted Personal Relevance despite a personal impact".to_string(),
            ));
        }
        warn!("Model omitted requested category '{}'", name);
    }

    categories.sort_by_key(|c| c.name.display_rank());
    Ok(categories)
}

/// Short summary used to seed the follow-up chat
pub fn build_analysis_context(
    topic: &str,
    hours_description: &str,
    categories: &[Category],
) -> String {
    let mut lines = vec![
        format!("Topic: {}", topic),
        hours_description.to_string(),
        "Category weights:".to_string(),
    ];
    lines.extend(
        categories
            .iter()
            .map(|c| format!("- {}: {}/10", c.name, c.weight)),
    );
    lines.join("\n")
}
