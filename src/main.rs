//! Remodely - AI chat service
//!
//! HTTP entry point for the Remodely chat orchestration server.

#![forbid(unsafe_code)]

use anyhow::Result;
use remodely::server;
use remodely_llm::{Orchestrator, ProviderRegistry};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remodely=info,remodely_llm=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Remodely AI service v{}", env!("CARGO_PKG_VERSION"));

    let config = server::ServerConfig::from_env()?;
    let registry = Arc::new(ProviderRegistry::from_env()?);
    let orchestrator = Arc::new(Orchestrator::new(registry));

    server::run(config, orchestrator).await
}
