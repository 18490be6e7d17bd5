//! Conversation and response types
//!
//! This module defines the caller-facing data model: role-tagged
//! messages in, a single normalized `ChatResponse` out. The response
//! shape is shared by every terminal path (success, cache hit,
//! offline, unavailable) so callers never need error handling around
//! chat calls.

use crate::routing::RouteStrategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role in a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions)
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
}

impl MessageRole {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A message in a conversation
///
/// Insertion order is the conversation turn order; messages are never
/// mutated once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-request routing and sampling preferences
///
/// All fields are optional; the orchestrator resolves the effective
/// strategy (`provider` alone implies `specific`, nothing at all means
/// `balanced`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatOptions {
    /// Candidate-ordering strategy
    pub strategy: Option<RouteStrategy>,
    /// Pin the request to a single named provider
    pub provider: Option<String>,
    /// Sampling temperature (adapter default applies when absent)
    pub temperature: Option<f32>,
    /// Maximum output tokens (adapter default applies when absent)
    #[serde(rename = "maxTokens")]
    pub max_tokens: Option<u32>,
    /// Overall budget for the whole fallback chain; a slow provider
    /// is cut off and recorded as a failure when it elapses
    #[serde(skip)]
    pub deadline: Option<Duration>,
}

impl ChatOptions {
    /// Options pinned to a single provider
    #[must_use]
    pub fn for_provider(name: impl Into<String>) -> Self {
        Self {
            provider: Some(name.into()),
            ..Default::default()
        }
    }

    /// Options with an explicit strategy
    #[must_use]
    pub fn with_strategy(strategy: RouteStrategy) -> Self {
        Self {
            strategy: Some(strategy),
            ..Default::default()
        }
    }
}

/// Best-effort token accounting reported by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Input (prompt) tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    /// Output (completion) tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
}

/// One recorded provider failure in the fallback chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// Provider name
    pub provider: String,
    /// Vendor or transport error message
    pub error: String,
}

/// Normalized chat result
///
/// Produced once per routing attempt and not mutated afterwards; the
/// cache stores a copy and stamps `cache_hit` only on the copy handed
/// to a cache-hitting caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Reply text, always present and suitable for direct display
    pub reply: String,
    /// Model that answered (or `offline` / `unavailable`)
    pub model: String,
    /// Provider that answered (`none` for degraded responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Token usage, when the vendor reported it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Providers that failed before the one that answered
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_tried: Vec<String>,
    /// Full failure record when every candidate failed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_chain: Vec<ProviderFailure>,
    /// Whether this response was served from the cache
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cache_hit: bool,
}

impl ChatResponse {
    /// Create a bare successful response
    #[must_use]
    pub fn new(reply: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            model: model.into(),
            provider: None,
            usage: None,
            fallback_tried: Vec::new(),
            error_chain: Vec::new(),
            cache_hit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let system = Message::system("You are a helpful assistant");
        assert_eq!(system.role, MessageRole::System);

        let user = Message::user("Hello!");
        assert_eq!(user.role, MessageRole::User);

        let assistant = Message::assistant("Hi there!");
        assert_eq!(assistant.role, MessageRole::Assistant);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert!(json.contains(r#""role":"user""#));
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: ChatOptions =
            serde_json::from_str(r#"{"strategy":"cost","maxTokens":256,"temperature":0.2}"#)
                .unwrap();
        assert_eq!(options.strategy, Some(RouteStrategy::Cost));
        assert_eq!(options.max_tokens, Some(256));
        assert_eq!(options.temperature, Some(0.2));
    }

    #[test]
    fn test_response_omits_empty_fields() {
        let response = ChatResponse::new("ok", "test-model");
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("fallbackTried"));
        assert!(!json.contains("errorChain"));
        assert!(!json.contains("cacheHit"));
        assert!(!json.contains("usage"));
    }

    #[test]
    fn test_response_wire_field_names() {
        let response = ChatResponse {
            fallback_tried: vec!["openai".to_string()],
            error_chain: vec![ProviderFailure {
                provider: "openai".to_string(),
                error: "api error".to_string(),
            }],
            cache_hit: true,
            ..ChatResponse::new("ok", "m")
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""fallbackTried":["openai"]"#));
        assert!(json.contains(r#""errorChain""#));
        assert!(json.contains(r#""cacheHit":true"#));
    }
}
