//! API routes for topicweightd
//!
//! Every error response is `{"error": "<fixed message>"}`. Internal detail
//! is logged here and never sent to the client.

use crate::prompts::chat_system_prompt;
use crate::server::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use topicweight_common::{
    AnalysisError, AnalysisRequest, ChatMessage, ChatRequest, ChatResponse, ErrorBody,
    HealthResponse, CHAT_INVALID_MESSAGE, INVALID_BODY_MESSAGE, TOPIC_REQUIRED_MESSAGE,
};
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

fn analysis_error_response(err: &AnalysisError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, err.user_message())
}

// ============================================================================
// Analysis Routes
// ============================================================================

pub fn analysis_routes() -> Router<AppStateArc> {
    Router::new().route("/calculate-weight", post(calculate_weight))
}

async fn calculate_weight(
    State(state): State<AppStateArc>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("  Rejected analysis body: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, TOPIC_REQUIRED_MESSAGE);
        }
    };

    let has_topic = body
        .get("topic")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty());

    let request: AnalysisRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => {
            warn!("  Rejected analysis body: {}", e);
            let message = if has_topic {
                INVALID_BODY_MESSAGE
            } else {
                TOPIC_REQUIRED_MESSAGE
            };
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };

    match state.orchestrator.handle(request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => analysis_error_response(&e),
    }
}

// ============================================================================
// Chat Routes
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/chat", post(chat))
}

async fn chat(
    State(state): State<AppStateArc>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("  Rejected chat body: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, CHAT_INVALID_MESSAGE);
        }
    };

    let (conversation, context) = match request.validate() {
        Ok(parts) => parts,
        Err(e) => return analysis_error_response(&e),
    };

    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(ChatMessage::new("system", chat_system_prompt(&context)));
    messages.extend(conversation);

    info!("  Chat turn with {} messages", messages.len());

    match state.chat.reply(&messages).await {
        Ok(reply) => Json(ChatResponse { reply }).into_response(),
        Err(e) => {
            error!("  Chat failed: {}", e);
            analysis_error_response(&e)
        }
    }
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        ground_truth_enabled: state.orchestrator.ground_truth_enabled(),
    })
}
