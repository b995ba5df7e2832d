//! HTTP server for topicweightd

use crate::config::Config;
use crate::ground_truth;
use crate::llm_client::OpenAiClient;
use crate::llm_trait::ChatResponder;
use crate::orchestrator::AnalysisOrchestrator;
use crate::routes;
use crate::search::SerpApiResolver;
use anyhow::{Context, Result};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Application state shared across handlers
pub struct AppState {
    pub orchestrator: AnalysisOrchestrator,
    pub chat: Arc<dyn ChatResponder>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(orchestrator: AnalysisOrchestrator, chat: Arc<dyn ChatResponder>) -> Self {
        Self {
            orchestrator,
            chat,
            start_time: Instant::now(),
        }
    }

    /// Wire production providers from config
    pub fn from_config(config: &Config) -> Result<Self> {
        let llm = Arc::new(OpenAiClient::new(&config.llm)?);
        let resolver = Arc::new(SerpApiResolver::new(&config.search)?);
        let ground_truth = ground_truth::from_config(&config.ground_truth)?;

        info!("  Analysis model: {}", llm.analysis_model());

        let orchestrator = AnalysisOrchestrator::new(llm.clone(), resolver, ground_truth)
            .with_timeout(Duration::from_secs(config.server.analysis_timeout_secs));

        Ok(Self::new(orchestrator, llm))
    }
}

/// Build the router; unmatched paths fall through to `static_dir` if set
pub fn router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let app = Router::new()
        .merge(routes::analysis_routes())
        .merge(routes::chat_routes())
        .merge(routes::health_routes())
        .with_state(state);

    let app = match static_dir {
        Some(dir) => {
            info!("  Serving static files from {}", dir.display());
            app.fallback_service(ServeDir::new(dir))
        }
        None => app,
    };

    app.layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until ctrl-c
pub async fn run(config: &Config, state: AppState) -> Result<()> {
    let app = router(Arc::new(state), config.server.static_dir.clone());

    let addr = config.server.bind_addr.as_str();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gracefully");
        })
        .await?;
    Ok(())
}
