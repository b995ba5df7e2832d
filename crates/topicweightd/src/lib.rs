//! Topic Weight daemon library - exposes modules for testing.

pub mod config;
pub mod enrichment;
pub mod ground_truth;
pub mod llm_client;
pub mod llm_trait;
pub mod orchestrator;
pub mod prompts;
pub mod routes;
pub mod search;
pub mod server;
