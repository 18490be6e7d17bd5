//! Test-only stub provider shared by the routing, registry, and
//! orchestrator test modules.

use crate::chat::{Message, TokenUsage};
use crate::error::{Error, Result};
use crate::provider::{CallOptions, ChatProvider, ProviderCost, ProviderMetadata, ProviderReply};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted in-memory provider
pub(crate) struct StubProvider {
    meta: ProviderMetadata,
    /// Reply text on success, `None` to fail every call
    reply: Option<String>,
    /// Artificial latency before answering
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub(crate) fn enabled(name: &'static str) -> Self {
        Self {
            meta: ProviderMetadata {
                name,
                display_name: name,
                model: format!("{name}-model"),
                enabled: true,
                cost: Some(ProviderCost {
                    input_per_1k: 0.001,
                    output_per_1k: 0.002,
                }),
                quality_tier: Some(5),
            },
            reply: Some(format!("ok-{name}")),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn disabled(name: &'static str) -> Self {
        let mut stub = Self::enabled(name);
        stub.meta.enabled = false;
        stub
    }

    pub(crate) fn failing(name: &'static str) -> Self {
        let mut stub = Self::enabled(name);
        stub.reply = None;
        stub
    }

    pub(crate) fn with_cost(mut self, total_per_1k: Option<f64>) -> Self {
        self.meta.cost = total_per_1k.map(|total| ProviderCost {
            input_per_1k: total / 2.0,
            output_per_1k: total / 2.0,
        });
        self
    }

    pub(crate) fn with_quality(mut self, tier: Option<u8>) -> Self {
        self.meta.quality_tier = tier;
        self
    }

    pub(crate) fn with_reply(mut self, reply: &str) -> Self {
        self.reply = Some(reply.to_string());
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChatProvider for StubProvider {
    fn meta(&self) -> &ProviderMetadata {
        &self.meta
    }

    async fn chat(&self, _messages: &[Message], _options: &CallOptions) -> Result<ProviderReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            Some(reply) => Ok(ProviderReply {
                reply: reply.clone(),
                model: self.meta.model.clone(),
                usage: Some(TokenUsage {
                    input_tokens: Some(10),
                    output_tokens: Some(5),
                }),
            }),
            None => Err(Error::Api(format!("{} is down", self.meta.name))),
        }
    }
}
