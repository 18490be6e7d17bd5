//! Chat endpoints
//!
//! `POST /ai/chat` is deliberately infallible at the HTTP level: the
//! orchestrator encodes every failure mode in the response body, so
//! this handler always answers 200 with a well-formed `ChatResponse`.

use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use remodely_llm::{ChatOptions, ChatResponse, Message, ProviderStatus};
use serde::{Deserialize, Serialize};

use super::AppState;

/// Chat request body
///
/// Routing options ride alongside the messages at the top level,
/// e.g. `{"messages": [...], "strategy": "cost", "temperature": 0.2}`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub options: ChatOptions,
}

/// Provider diagnostics response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub providers: Vec<ProviderStatus>,
    pub enabled_count: usize,
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Json<ChatResponse> {
    let mut options = request.options;
    if options.deadline.is_none() {
        options.deadline = state.chat_deadline;
    }

    Json(state.orchestrator.chat(&request.messages, &options).await)
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let providers = state.orchestrator.registry().statuses();
    let enabled_count = providers.iter().filter(|p| p.enabled).count();

    Json(StatusResponse {
        providers,
        enabled_count,
    })
}

/// Create chat routes
pub fn chat_routes(state: AppState) -> Router {
    Router::new()
        .route("/ai/chat", post(chat))
        .route("/ai/status", get(status))
        .with_state(state)
}
