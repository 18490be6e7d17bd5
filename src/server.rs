//! Server module for Remodely
//!
//! Contains the HTTP server configuration and runtime logic.

use anyhow::{Context, Result};
use axum::Router;
use remodely_llm::Orchestrator;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api;

/// Server configuration, read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Overall time budget handed to the orchestrator per chat request
    pub chat_deadline: Option<Duration>,
}

impl ServerConfig {
    /// Read configuration from `REMODELY_*` environment variables,
    /// falling back to local-development defaults
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("REMODELY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match std::env::var("REMODELY_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid REMODELY_PORT: {raw}"))?,
            Err(_) => 8080,
        };
        let chat_deadline = match std::env::var("REMODELY_CHAT_DEADLINE_MS") {
            Ok(raw) => {
                let ms = raw
                    .parse::<u64>()
                    .with_context(|| format!("invalid REMODELY_CHAT_DEADLINE_MS: {raw}"))?;
                Some(Duration::from_millis(ms))
            }
            Err(_) => None,
        };

        Ok(Self {
            host,
            port,
            chat_deadline,
        })
    }
}

/// Build the application router with tracing and CORS layers
pub fn build_router(orchestrator: Arc<Orchestrator>, chat_deadline: Option<Duration>) -> Router {
    api::api_router(api::AppState {
        orchestrator,
        chat_deadline,
    })
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped
pub async fn run(config: ServerConfig, orchestrator: Arc<Orchestrator>) -> Result<()> {
    let app = build_router(orchestrator, config.chat_deadline);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Listening on {addr}");
    axum::serve(listener, app)
        .await
        .context("server exited with error")
}
