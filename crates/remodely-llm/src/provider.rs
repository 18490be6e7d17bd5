//! Provider adapter contract and static metadata
//!
//! Each vendor adapter translates the generic conversation into its
//! wire format, issues exactly one outbound call, and normalizes the
//! reply. Retry and fallback are the orchestrator's job; an adapter
//! never retries internally.

use crate::chat::{Message, TokenUsage};
use crate::error::Result;
use serde::Serialize;

/// Default sampling temperature when the caller gives none
pub const DEFAULT_TEMPERATURE: f32 = 0.6;

/// Default maximum output tokens when the caller gives none
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Per-1K-token pricing in USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCost {
    /// USD per 1K input tokens
    pub input_per_1k: f64,
    /// USD per 1K output tokens
    pub output_per_1k: f64,
}

impl ProviderCost {
    /// Combined input+output price, the cost-strategy sort key
    #[must_use]
    pub fn total_per_1k(&self) -> f64 {
        self.input_per_1k + self.output_per_1k
    }
}

/// Static per-adapter descriptor
///
/// Built once at startup. `enabled` reflects credential presence at
/// construction time and is never re-evaluated.
#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    /// Unique routing key (e.g. `openai`)
    pub name: &'static str,
    /// Human-readable name for diagnostics/UI
    pub display_name: &'static str,
    /// Model the adapter will call
    pub model: String,
    /// Whether a credential was present at construction
    pub enabled: bool,
    /// Pricing, when known
    pub cost: Option<ProviderCost>,
    /// Heuristic quality ranking (higher is better), when known
    pub quality_tier: Option<u8>,
}

/// Per-call sampling parameters passed to an adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum output tokens
    pub max_tokens: Option<u32>,
}

impl CallOptions {
    /// Effective temperature with the documented default applied
    #[must_use]
    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Effective max tokens with the documented default applied
    #[must_use]
    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// Normalized reply from a single provider call
#[derive(Debug, Clone)]
pub struct ProviderReply {
    /// Reply text (empty string when the vendor returned none)
    pub reply: String,
    /// Model that actually answered
    pub model: String,
    /// Best-effort token accounting
    pub usage: Option<TokenUsage>,
}

/// Trait for chat providers
///
/// Adapters with no credential must fail fast with
/// [`Error::MissingCredential`](crate::Error::MissingCredential)
/// instead of attempting the call. Routing filters disabled adapters
/// out before they are ever invoked, so the error only surfaces when
/// a caller pins a disabled provider explicitly.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Get the static descriptor
    fn meta(&self) -> &ProviderMetadata;

    /// Whether a credential was configured at construction
    fn is_enabled(&self) -> bool {
        self.meta().enabled
    }

    /// Complete a conversation with one outbound vendor call
    async fn chat(&self, messages: &[Message], options: &CallOptions) -> Result<ProviderReply>;
}

/// Split the conversation into at most one consolidated system text
/// plus the user/assistant turns
///
/// Vendors differ in whether system content is a dedicated field or
/// must be folded into the prompt; every adapter starts from this
/// split. Multiple system messages are joined in order.
#[must_use]
pub fn split_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
    let mut system_parts = Vec::new();
    let mut turns = Vec::new();

    for msg in messages {
        match msg.role {
            crate::chat::MessageRole::System => {
                if !msg.content.is_empty() {
                    system_parts.push(msg.content.as_str());
                }
            }
            _ => turns.push(msg),
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    (system, turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::MessageRole;

    #[test]
    fn test_call_options_defaults() {
        let options = CallOptions::default();
        assert_eq!(options.temperature_or_default(), DEFAULT_TEMPERATURE);
        assert_eq!(options.max_tokens_or_default(), DEFAULT_MAX_TOKENS);

        let options = CallOptions {
            temperature: Some(0.1),
            max_tokens: Some(64),
        };
        assert_eq!(options.temperature_or_default(), 0.1);
        assert_eq!(options.max_tokens_or_default(), 64);
    }

    #[test]
    fn test_cost_total() {
        let cost = ProviderCost {
            input_per_1k: 0.0025,
            output_per_1k: 0.01,
        };
        assert!((cost.total_per_1k() - 0.0125).abs() < f64::EPSILON);
    }

    #[test]
    fn test_split_system() {
        let messages = vec![
            Message::system("You are helpful"),
            Message::user("Hello"),
            Message::assistant("Hi there!"),
        ];

        let (system, turns) = split_system(&messages);
        assert_eq!(system, Some("You are helpful".to_string()));
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, MessageRole::User);
    }

    #[test]
    fn test_split_system_joins_multiple() {
        let messages = vec![
            Message::system("First"),
            Message::user("Hello"),
            Message::system("Second"),
        ];

        let (system, turns) = split_system(&messages);
        assert_eq!(system, Some("First\n\nSecond".to_string()));
        assert_eq!(turns.len(), 1);
    }

    #[test]
    fn test_split_system_none() {
        let messages = vec![Message::user("Hello")];
        let (system, turns) = split_system(&messages);
        assert_eq!(system, None);
        assert_eq!(turns.len(), 1);
    }
}
