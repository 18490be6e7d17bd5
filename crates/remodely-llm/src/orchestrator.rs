//! Chat orchestrator
//!
//! Ties routing, cache, and adapters together: resolve the strategy,
//! check the cache, then try candidates strictly in order — awaiting
//! each provider sequentially, never racing them, because cost/quality
//! ordering only means something when cheaper/better options are tried
//! first and the rest are skipped on success.
//!
//! No error ever escapes [`Orchestrator::chat`]: every path terminates
//! in a well-formed [`ChatResponse`], including the degraded `offline`
//! and `unavailable` terminals.

use crate::cache::{fingerprint, ResponseCache};
use crate::chat::{ChatOptions, ChatResponse, Message, MessageRole, ProviderFailure};
use crate::error::Error;
use crate::provider::CallOptions;
use crate::registry::ProviderRegistry;
use crate::routing::{self, RouteStrategy};
use crate::util::truncate_safe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Provider calls slower than this get a warning log. Observability
/// only — control flow is unaffected.
pub const SLOW_CALL_MS: u64 = 4000;

/// Characters of the caller's last message echoed in the offline reply
const OFFLINE_ECHO_CHARS: usize = 140;

/// Multi-provider chat orchestrator
///
/// Explicitly constructed and injected into request handlers; owns its
/// registry handle and cache so tests can swap in mock adapters.
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    cache: ResponseCache,
}

impl Orchestrator {
    /// Create an orchestrator over a registry with the default cache TTL
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            cache: ResponseCache::default(),
        }
    }

    /// Override the cache TTL
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = ResponseCache::new(ttl);
        self
    }

    /// The registry backing this orchestrator
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Route a conversation to the best available provider
    ///
    /// Infallible by contract: failure is encoded in the response
    /// (`model: "offline"` / `model: "unavailable"`), never thrown.
    #[instrument(skip(self, messages, options), fields(strategy = ?options.strategy, provider = ?options.provider))]
    pub async fn chat(&self, messages: &[Message], options: &ChatOptions) -> ChatResponse {
        let strategy = effective_strategy(options);
        let enabled = self.registry.enabled();
        let candidates = routing::order(&enabled, Some(strategy), options.provider.as_deref());

        if candidates.is_empty() {
            info!("No eligible providers, returning offline response");
            return offline_response(messages);
        }

        let key = fingerprint(
            messages,
            strategy,
            options.provider.as_deref(),
            options.temperature,
        );
        if let Some(hit) = self.cache.get(&key) {
            info!(provider = ?hit.provider, "Cache hit");
            return hit;
        }

        let call_options = CallOptions {
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let chain_started = Instant::now();
        let mut error_chain: Vec<ProviderFailure> = Vec::new();

        for candidate in candidates {
            let name = candidate.meta().name;
            let started = Instant::now();

            let result = match remaining_budget(options.deadline, chain_started) {
                Budget::Unlimited => candidate.chat(messages, &call_options).await,
                Budget::Remaining(budget) => {
                    match tokio::time::timeout(budget, candidate.chat(messages, &call_options))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(Error::Timeout(budget.as_millis() as u64)),
                    }
                }
                Budget::Exhausted => Err(Error::Timeout(0)),
            };

            let elapsed_ms = started.elapsed().as_millis() as u64;
            if elapsed_ms > SLOW_CALL_MS {
                warn!(provider = name, elapsed_ms, "Slow provider call");
            }

            match result {
                Ok(reply) => {
                    let response = ChatResponse {
                        reply: reply.reply,
                        model: reply.model,
                        provider: Some(name.to_string()),
                        usage: reply.usage,
                        fallback_tried: error_chain.iter().map(|f| f.provider.clone()).collect(),
                        error_chain: Vec::new(),
                        cache_hit: false,
                    };

                    info!(
                        provider = name,
                        fallbacks = response.fallback_tried.len(),
                        elapsed_ms,
                        "Provider answered"
                    );

                    self.cache.set(key, &response);
                    return response;
                }
                Err(error) => {
                    warn!(provider = name, error = %error, "Provider failed, trying next candidate");
                    error_chain.push(ProviderFailure {
                        provider: name.to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }

        warn!(failed = error_chain.len(), "All providers exhausted");
        unavailable_response(error_chain)
    }
}

/// Resolve the effective strategy: explicit strategy wins, a bare
/// `provider` implies `specific`, otherwise `balanced`
fn effective_strategy(options: &ChatOptions) -> RouteStrategy {
    options.strategy.unwrap_or(if options.provider.is_some() {
        RouteStrategy::Specific
    } else {
        RouteStrategy::Balanced
    })
}

/// How much of the caller's deadline is left for the next attempt
enum Budget {
    Unlimited,
    Remaining(Duration),
    Exhausted,
}

fn remaining_budget(deadline: Option<Duration>, chain_started: Instant) -> Budget {
    match deadline {
        None => Budget::Unlimited,
        Some(deadline) => match deadline.checked_sub(chain_started.elapsed()) {
            Some(remaining) if !remaining.is_zero() => Budget::Remaining(remaining),
            _ => Budget::Exhausted,
        },
    }
}

/// Degraded-mode terminal for an empty candidate list
///
/// Not an error path: callers get a displayable reply echoing their
/// last message, with sentinel provider/model values.
fn offline_response(messages: &[Message]) -> ChatResponse {
    let last_user = messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| truncate_safe(&m.content, OFFLINE_ECHO_CHARS))
        .unwrap_or_default();

    ChatResponse {
        reply: format!(
            "AI is offline (no providers configured). You said: \"{last_user}\""
        ),
        model: "offline".to_string(),
        provider: Some("none".to_string()),
        usage: None,
        fallback_tried: Vec::new(),
        error_chain: Vec::new(),
        cache_hit: false,
    }
}

/// Terminal response when every candidate failed
fn unavailable_response(error_chain: Vec<ProviderFailure>) -> ChatResponse {
    ChatResponse {
        reply: "All AI providers are currently unavailable. Please try again shortly.".to_string(),
        model: "unavailable".to_string(),
        provider: Some("none".to_string()),
        usage: None,
        fallback_tried: Vec::new(),
        error_chain,
        cache_hit: false,
    }
}
