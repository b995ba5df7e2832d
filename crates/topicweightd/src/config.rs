//! Configuration management for topicweightd.
//!
//! Loads settings from a TOML file or uses defaults. Lookup order:
//! `--config` flag, `TOPICWEIGHT_CONFIG`, then `/etc/topicweight/config.toml`.
//! API keys fall back to `OPENAI_API_KEY` / `SERPAPI_API_KEY` when the file
//! leaves them unset.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Config file path
pub const CONFIG_PATH: &str = "/etc/topicweight/config.toml";

/// Environment override for the config file path
pub const CONFIG_ENV: &str = "TOPICWEIGHT_CONFIG";

pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const SERPAPI_KEY_ENV: &str = "SERPAPI_API_KEY";

/// Search providers never return more than this many sources per fact
pub const MAX_SOURCES_PER_FACT: usize = 3;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory with the web UI, served for unmatched paths
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Upper bound for one full analysis (generation + enrichment)
    #[serde(default = "default_analysis_timeout")]
    pub analysis_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_analysis_timeout() -> u64 {
    90
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            static_dir: None,
            analysis_timeout_secs: default_analysis_timeout(),
        }
    }
}

/// LLM provider configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Model for structured category generation
    #[serde(default = "default_model")]
    pub analysis_model: String,

    /// Model for follow-up chat
    #[serde(default = "default_model")]
    pub chat_model: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            analysis_model: default_model(),
            chat_model: default_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Web search provider configuration (SerpAPI-compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,
}

fn default_search_base_url() -> String {
    "https://serpapi.com".to_string()
}

fn default_max_results() -> usize {
    MAX_SOURCES_PER_FACT
}

fn default_lookup_timeout() -> u64 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            api_key: None,
            max_results: default_max_results(),
            timeout_secs: default_lookup_timeout(),
        }
    }
}

impl SearchConfig {
    /// Configured result count, capped at [`MAX_SOURCES_PER_FACT`]
    pub fn effective_max_results(&self) -> usize {
        self.max_results.clamp(1, MAX_SOURCES_PER_FACT)
    }
}

/// Optional news-context lookup for cited sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,
}

impl Default for GroundTruthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            timeout_secs: default_lookup_timeout(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub ground_truth: GroundTruthConfig,
}

impl Config {
    /// Resolve which file to read
    pub fn resolve_path(cli_path: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_path {
            return path.to_path_buf();
        }
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_PATH))
    }

    /// Load config from file. A missing file means defaults; a malformed
    /// file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Fill API keys missing from the file from the process environment
    pub fn apply_env(self) -> Self {
        self.with_fallback_keys(
            std::env::var(OPENAI_KEY_ENV).ok(),
            std::env::var(SERPAPI_KEY_ENV).ok(),
        )
    }

    pub fn with_fallback_keys(
        mut self,
        llm_key: Option<String>,
        search_key: Option<String>,
    ) -> Self {
        if self.llm.api_key.as_deref().map_or(true, str::is_empty) {
            self.llm.api_key = llm_key.filter(|k| !k.is_empty());
        }
        if self.search.api_key.as_deref().map_or(true, str::is_empty) {
            self.search.api_key = search_key.filter(|k| !k.is_empty());
        }
        self
    }
}
