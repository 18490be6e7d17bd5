//! Web API module for Remodely
//!
//! Provides REST endpoints for:
//! - Chat completion (`POST /ai/chat`)
//! - Provider diagnostics (`GET /ai/status`)
//! - Health checks (`GET /health`)

pub mod chat;
pub mod health;

use axum::Router;
use remodely_llm::Orchestrator;
use std::sync::Arc;
use std::time::Duration;

pub use chat::chat_routes;
pub use health::health_routes;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Per-request time budget applied to every chat call
    pub chat_deadline: Option<Duration>,
}

/// Create the API router with all endpoints
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(chat_routes(state))
        .merge(health_routes())
}
