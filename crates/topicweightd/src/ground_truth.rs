//! Ground truth context lookup for cited sources.
//!
//! Given a source URL, an external service may return a short summary of
//! what the page actually reports. The capability is optional: when disabled
//! the `NoopGroundTruth` implementation returns an empty context, so the
//! enrichment pipeline calls the same interface either way.

use crate::config::GroundTruthConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[async_trait]
pub trait GroundTruthLookup: Send + Sync {
    /// Context text for a URL, empty when unavailable
    async fn lookup(&self, url: &str) -> String;

    fn is_enabled(&self) -> bool;
}

/// Disabled lookup
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGroundTruth;

#[async_trait]
impl GroundTruthLookup for NoopGroundTruth {
    async fn lookup(&self, _url: &str) -> String {
        String::new()
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[derive(Debug, Deserialize)]
struct ContextResponse {
    #[serde(default)]
    context: String,
}

/// Lookup against `GET {base_url}/context?url=...` returning `{"context": "..."}`
pub struct HttpGroundTruth {
    http: reqwest::Client,
    base_url: String,
}

impl HttpGroundTruth {
    pub fn new(config: &GroundTruthConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build ground truth HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(format!("{}/context", self.base_url))
            .query(&[("url", url)])
            .send()
            .await
            .context("Ground truth request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Ground truth service returned {}", response.status());
        }

        let body: ContextResponse = response
            .json()
            .await
            .context("Failed to parse ground truth response")?;
        Ok(body.context)
    }
}

#[async_trait]
impl GroundTruthLookup for HttpGroundTruth {
    async fn lookup(&self, url: &str) -> String {
        match self.fetch(url).await {
            Ok(context) => {
                debug!("Ground truth for {}: {} chars", url, context.len());
                context
            }
            Err(e) => {
                warn!("Ground truth lookup failed for {}: {:#}", url, e);
                String::new()
            }
        }
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Pick the implementation named by config
pub fn from_config(config: &GroundTruthConfig) -> Result<Arc<dyn GroundTruthLookup>> {
    if config.enabled && !config.base_url.trim().is_empty() {
        info!("Ground truth lookup enabled ({})", config.base_url);
        Ok(Arc::new(HttpGroundTruth::new(config)?))
    } else {
        if config.enabled {
            warn!("Ground truth enabled without base_url, staying disabled");
        }
        Ok(Arc::new(NoopGroundTruth))
    }
}
