//! HTTP client for communicating with topicweightd.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use topicweight_common::{AnalysisRequest, AnalysisResponse, ErrorBody, HealthResponse};

/// Analyses fan out to an LLM and a search provider; allow them time
const REQUEST_TIMEOUT_SECS: u64 = 180;

pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
}

impl DaemonClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        let response = self
            .http
            .post(format!("{}/calculate-weight", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;
        Self::decode(response).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;
        Self::decode(response).await
    }

    fn unreachable(&self, e: reqwest::Error) -> anyhow::Error {
        anyhow!(
            "Cannot reach Topic Weight daemon at {}: {}\n\n\
             Start it with: topicweightd --bind 127.0.0.1:3000",
            self.base_url,
            e
        )
    }

    /// Parse a success body, or surface the daemon's `{error}` message
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.context("Invalid response from daemon");
        }

        match response.json::<ErrorBody>().await {
            Ok(body) => Err(anyhow!("{} ({})", body.error, status)),
            Err(_) => Err(anyhow!("Daemon returned {}", status)),
        }
    }
}
