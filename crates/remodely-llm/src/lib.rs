//! Remodely LLM - Multi-provider chat orchestration
//!
//! This crate provides the AI chat layer for Remodely:
//! - Provider: adapter trait, per-vendor metadata (cost, quality tier)
//! - OpenAI: GPT-4o family
//! - Anthropic: Claude 3.5 family
//! - Gemini: Google Gemini 1.5 family
//! - Grok: xAI Grok 2 (OpenAI-compatible wire format)
//! - Registry: insertion-ordered provider set built from configuration
//! - Routing: cost / quality / balanced / specific candidate ordering
//! - Cache: short-TTL response memoization keyed on the conversation tail
//! - Orchestrator: sequential fallback chain, always returns a response

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod anthropic;
pub mod cache;
pub mod chat;
pub mod error;
pub mod gemini;
pub mod grok;
pub mod openai;
pub mod orchestrator;
pub mod provider;
pub mod registry;
pub mod routing;
#[cfg(test)]
pub(crate) mod testing;
pub mod util;

pub use chat::{ChatOptions, ChatResponse, Message, MessageRole, ProviderFailure, TokenUsage};
pub use error::{Error, Result};
pub use orchestrator::Orchestrator;
pub use provider::{
    CallOptions, ChatProvider, ProviderCost, ProviderMetadata, ProviderReply, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
pub use registry::{ProviderRegistry, ProviderStatus};
pub use routing::RouteStrategy;

// Re-export provider types
pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use grok::{GrokConfig, GrokProvider};
pub use openai::{OpenAiConfig, OpenAiProvider};
