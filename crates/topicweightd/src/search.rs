//! Fact source resolution via web search.
//!
//! Each fact is used as a search query (plus an optional year hint) and the
//! top organic results become its candidate sources. Resolution never fails
//! from the caller's point of view: any provider problem is logged and the
//! fact simply gets no sources.

use crate::config::{SearchConfig, MAX_SOURCES_PER_FACT};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use topicweight_common::Source;
use tracing::{debug, warn};

/// Query string for a fact
pub fn build_query(fact: &str, year: Option<i32>) -> String {
    match year {
        Some(year) => format!("{} {}", fact.trim(), year),
        None => fact.trim().to_string(),
    }
}

/// Looks up candidate sources for one fact
#[async_trait]
pub trait FactSourceResolver: Send + Sync {
    /// At most [`MAX_SOURCES_PER_FACT`] sources, empty on any failure
    async fn resolve(&self, fact: &str, year: Option<i32>) -> Vec<Source>;
}

/// Search client errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Search API key not configured")]
    MissingApiKey,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

// ============================================================================
// SerpAPI Resolver (Production)
// ============================================================================

/// Resolver backed by a SerpAPI-compatible `search.json` endpoint
pub struct SerpApiResolver {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
}

impl SerpApiResolver {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build search HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_results: config.effective_max_results(),
        })
    }

    /// Run one search; single attempt, no retry
    pub async fn search(&self, query: &str) -> Result<Vec<Source>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;
        let num = self.max_results.to_string();

        let response = self
            .http
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", num.as_str()),
                ("api_key", api_key),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        Ok(body
            .organic_results
            .into_iter()
            .take(self.max_results)
            .map(|r| Source::new(r.title, r.link, r.snippet))
            .collect())
    }
}

#[async_trait]
impl FactSourceResolver for SerpApiResolver {
    async fn resolve(&self, fact: &str, year: Option<i32>) -> Vec<Source> {
        let query = build_query(fact, year);
        match self.search(&query).await {
            Ok(sources) => {
                debug!("Search '{}' returned {} sources", query, sources.len());
                sources
            }
            Err(e) => {
                warn!("Source lookup failed for '{}': {}", query, e);
                Vec::new()
            }
        }
    }
}

// ============================================================================
// Fake Resolver (Testing)
// ============================================================================

/// Pre-configured outcome for one fact
#[derive(Debug, Clone)]
pub struct FakeLookup {
    pub result: Result<Vec<Source>, String>,
    pub delay: Duration,
}

/// Resolver answering from a fact -> outcome table.
///
/// Unknown facts resolve to no sources. Delays let tests force a completion
/// order different from dispatch order.
#[derive(Default)]
pub struct FakeResolver {
    lookups: HashMap<String, FakeLookup>,
    calls: AtomicUsize,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(mut self, fact: &str, sources: Vec<Source>) -> Self {
        self.lookups.insert(
            fact.to_string(),
            FakeLookup {
                result: Ok(sources),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn with_delayed_sources(
        mut self,
        fact: &str,
        sources: Vec<Source>,
        delay: Duration,
    ) -> Self {
        self.lookups.insert(
            fact.to_string(),
            FakeLookup {
                result: Ok(sources),
                delay,
            },
        );
        self
    }

    pub fn with_failure(mut self, fact: &str, error: &str) -> Self {
        self.lookups.insert(
            fact.to_string(),
            FakeLookup {
                result: Err(error.to_string()),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FactSourceResolver for FakeResolver {
    async fn resolve(&self, fact: &str, _year: Option<i32>) -> Vec<Source> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(lookup) = self.lookups.get(fact) else {
            return Vec::new();
        };

        if !lookup.delay.is_zero() {
            tokio::time::sleep(lookup.delay).await;
        }

        match &lookup.result {
            Ok(sources) => sources.iter().take(MAX_SOURCES_PER_FACT).cloned().collect(),
            Err(e) => {
                warn!("Source lookup failed for '{}': {}", fact, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_with_year() {
        assert_eq!(
            build_query("  Fuel prices rose 20%  ", Some(2022)),
            "Fuel prices rose 20% 2022"
        );
        assert_eq!(build_query("Fuel prices rose 20%", None), "Fuel prices rose 20%");
    }

    #[tokio::test]
    async fn test_missing_api_key_degrades_to_empty() {
        let resolver = SerpApiResolver::new(&SearchConfig::default()).unwrap();
        assert!(matches!(
            resolver.search("anything").await,
            Err(SearchError::MissingApiKey)
        ));
        assert!(resolver.resolve("anything", None).await.is_empty());
    }

    #[tokio::test]
    async fn test_fake_resolver_caps_results() {
        let sources = (0..5)
            .map(|i| Source::new("t", format!("https://s/{}", i), "x"))
            .collect();
        let resolver = FakeResolver::new().with_sources("fact", sources);
        assert_eq!(resolver.resolve("fact", None).await.len(), 3);
        assert!(resolver.resolve("other", None).await.is_empty());
        assert_eq!(resolver.call_count(), 2);
    }
}
