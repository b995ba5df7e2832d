//! Category enrichment pipeline.
//!
//! Flow:
//! 1. Fan out one source lookup per fact, across all categories at once
//! 2. Wait for every lookup, then re-attach results by position
//! 3. Walk categories -> facts -> sources in order and assign citation ids
//! 4. Export the registry as the reference list, with ground truth context
//!
//! Invariants:
//! - Output order never depends on lookup completion order
//! - Citation ids are assigned only in step 3, after full fan-in
//! - A failed lookup leaves its fact with no sources and affects nothing else

use crate::ground_truth::GroundTruthLookup;
use crate::search::FactSourceResolver;
use futures::future::join_all;
use std::sync::Arc;
use topicweight_common::{Category, CitationRegistry, CitedSource, Fact, GeneratedCategory, Source};
use tracing::{debug, info};

/// Categories with sourced facts plus the numbered reference list
#[derive(Debug, Clone)]
pub struct EnrichedAnalysis {
    pub categories: Vec<Category>,
    pub sources: Vec<CitedSource>,
}

pub struct CategoryEnrichmentPipeline {
    resolver: Arc<dyn FactSourceResolver>,
    ground_truth: Arc<dyn GroundTruthLookup>,
}

impl CategoryEnrichmentPipeline {
    pub fn new(
        resolver: Arc<dyn FactSourceResolver>,
        ground_truth: Arc<dyn GroundTruthLookup>,
    ) -> Self {
        Self {
            resolver,
            ground_truth,
        }
    }

    pub fn ground_truth_enabled(&self) -> bool {
        self.ground_truth.is_enabled()
    }

    pub async fn enrich(
        &self,
        categories: Vec<GeneratedCategory>,
        year: Option<i32>,
    ) -> EnrichedAnalysis {
        let fact_count: usize = categories.iter().map(|c| c.facts.len()).sum();
        info!(
            "Resolving sources for {} facts across {} categories",
            fact_count,
            categories.len()
        );

        let resolved = self.resolve_all(&categories, year).await;

        let mut enriched: Vec<Category> = categories
            .into_iter()
            .zip(resolved)
            .map(|(category, per_fact)| attach_sources(category, per_fact))
            .collect();

        let registry = assign_citations(&mut enriched);
        debug!("Assigned {} citations", registry.len());

        let sources = self.build_reference_list(registry).await;

        EnrichedAnalysis {
            categories: enriched,
            sources,
        }
    }

    /// One inner vec per category, one entry per fact, in input order
    async fn resolve_all(
        &self,
        categories: &[GeneratedCategory],
        year: Option<i32>,
    ) -> Vec<Vec<Vec<Source>>> {
        let per_category = categories.iter().map(|category| {
            join_all(
                category
                    .facts
                    .iter()
                    .map(|fact| self.resolver.resolve(fact, year)),
            )
        });
        join_all(per_category).await
    }

    async fn build_reference_list(&self, registry: CitationRegistry) -> Vec<CitedSource> {
        let exported = registry.export();
        let contexts = join_all(
            exported
                .iter()
                .map(|(_, source)| self.ground_truth.lookup(&source.link)),
        )
        .await;

        exported
            .into_iter()
            .zip(contexts)
            .map(|((citation, source), context)| CitedSource {
                citation,
                source,
                context,
            })
            .collect()
    }
}

fn attach_sources(category: GeneratedCategory, per_fact: Vec<Vec<Source>>) -> Category {
    let facts = category
        .facts
        .into_iter()
        .zip(per_fact)
        .map(|(text, sources)| Fact { text, sources })
        .collect();

    Category {
        name: category.name,
        weight: category.weight,
        facts,
        reasoning: category.reasoning,
    }
}

/// Sequential citation pass in category, fact, source order
pub fn assign_citations(categories: &mut [Category]) -> CitationRegistry {
    let mut registry = CitationRegistry::new();
    for category in categories.iter_mut() {
        for fact in category.facts.iter_mut() {
            for source in fact.sources.iter_mut() {
                source.citation_id = registry.assign(source);
            }
        }
    }
    registry
}
