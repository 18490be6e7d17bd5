//! Provider metadata registry
//!
//! Insertion-ordered set of adapters built once at startup.
//! Registration order doubles as the implicit routing priority when no
//! strategy is given.

use crate::anthropic::AnthropicProvider;
use crate::error::Result;
use crate::gemini::GeminiProvider;
use crate::grok::GrokProvider;
use crate::openai::OpenAiProvider;
use crate::provider::{ChatProvider, ProviderCost};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Read-only per-provider diagnostics row for the status endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    /// Routing key
    pub name: &'static str,
    /// Human-readable name
    pub display_name: &'static str,
    /// Configured model
    pub model: String,
    /// Whether a credential was present at startup
    pub enabled: bool,
    /// Pricing, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<ProviderCost>,
    /// Quality tier, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_tier: Option<u8>,
}

/// Insertion-ordered provider registry
///
/// Constructed once and shared behind an `Arc`; never mutated after
/// startup (tests register their own mock adapters instead).
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard four-vendor registry from environment
    /// configuration
    ///
    /// Order is fixed (openai, anthropic, gemini, grok) — it is the
    /// implicit priority for the default routing strategy. Providers
    /// with no credential are registered disabled.
    pub fn from_env() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(OpenAiProvider::from_env()?));
        registry.register(Arc::new(AnthropicProvider::from_env()?));
        registry.register(Arc::new(GeminiProvider::from_env()?));
        registry.register(Arc::new(GrokProvider::from_env()?));

        let enabled: Vec<&str> = registry.enabled().iter().map(|p| p.meta().name).collect();
        info!(enabled = ?enabled, total = registry.len(), "Provider registry initialized");

        Ok(registry)
    }

    /// Register a provider (appended, preserving order)
    pub fn register(&mut self, provider: Arc<dyn ChatProvider>) {
        debug!(
            provider = provider.meta().name,
            enabled = provider.is_enabled(),
            "Registering chat provider"
        );
        self.providers.push(provider);
    }

    /// Get a provider by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ChatProvider>> {
        self.providers
            .iter()
            .find(|p| p.meta().name == name)
            .cloned()
    }

    /// All registered providers in registration order
    #[must_use]
    pub fn all(&self) -> &[Arc<dyn ChatProvider>] {
        &self.providers
    }

    /// Enabled providers only, registration order preserved
    #[must_use]
    pub fn enabled(&self) -> Vec<Arc<dyn ChatProvider>> {
        self.providers
            .iter()
            .filter(|p| p.is_enabled())
            .cloned()
            .collect()
    }

    /// Diagnostics rows for every registered provider
    #[must_use]
    pub fn statuses(&self) -> Vec<ProviderStatus> {
        self.providers
            .iter()
            .map(|p| {
                let meta = p.meta();
                ProviderStatus {
                    name: meta.name,
                    display_name: meta.display_name,
                    model: meta.model.clone(),
                    enabled: meta.enabled,
                    cost: meta.cost,
                    quality_tier: meta.quality_tier,
                }
            })
            .collect()
    }

    /// Number of registered providers
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
