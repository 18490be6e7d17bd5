//! Anthropic - Claude messages provider
//!
//! This module implements the Anthropic Claude provider using reqwest.
//! Claude takes system content as a dedicated request field rather
//! than an inline message.

use crate::chat::{Message, TokenUsage};
use crate::error::{Error, Result};
use crate::provider::{
    split_system, CallOptions, ChatProvider, ProviderCost, ProviderMetadata, ProviderReply,
};
use crate::util::mask_api_key;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Sanitize Anthropic API error messages to prevent leaking sensitive information
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("invalid key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
        || lower.contains("x-api-key")
    {
        return "API authentication error. Please check your ANTHROPIC_API_KEY.".to_string();
    }

    if lower.contains("rate limit") || lower.contains("quota") || lower.contains("overloaded") {
        return "Anthropic rate limit exceeded. Please try again later.".to_string();
    }

    if lower.contains("internal") || lower.contains("server error") {
        return "Anthropic server error. Please try again later.".to_string();
    }

    if error.len() > 300 {
        format!("{}...(truncated)", crate::util::truncate_safe(error, 300))
    } else {
        error.to_string()
    }
}

/// Anthropic API version header value
const API_VERSION: &str = "2023-06-01";

/// Default Anthropic model
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Claude 3.5 Sonnet list price, USD per 1K tokens ($3.00/$15.00 per 1M)
const COST: ProviderCost = ProviderCost {
    input_per_1k: 0.003,
    output_per_1k: 0.015,
};

/// Heuristic quality ranking among the configured vendors
const QUALITY_TIER: u8 = 9;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    r#type: String,
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Anthropic provider configuration
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API key, absent when the provider is not configured
    pub api_key: Option<String>,
    /// Base URL
    pub base_url: String,
    /// Model to call
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask API key
impl fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &self.api_key.as_deref().map(mask_api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AnthropicConfig {
    /// Create a new configuration with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Create configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            base_url: std::env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    config: AnthropicConfig,
    meta: ProviderMetadata,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let meta = ProviderMetadata {
            name: "anthropic",
            display_name: "Anthropic Claude",
            model: config.model.clone(),
            enabled: config.api_key.is_some(),
            cost: Some(COST),
            quality_tier: Some(QUALITY_TIER),
        };

        Ok(Self {
            client,
            config,
            meta,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(AnthropicConfig::from_env())
    }

    /// Convert the conversation to Anthropic format, system text split out
    fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
        let (system, turns) = split_system(messages);
        let converted = turns
            .iter()
            .map(|msg| AnthropicMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            })
            .collect();
        (system, converted)
    }
}

#[async_trait::async_trait]
impl ChatProvider for AnthropicProvider {
    fn meta(&self) -> &ProviderMetadata {
        &self.meta
    }

    #[instrument(skip(self, messages, options), fields(model = %self.config.model))]
    async fn chat(&self, messages: &[Message], options: &CallOptions) -> Result<ProviderReply> {
        let Some(api_key) = &self.config.api_key else {
            return Err(Error::MissingCredential("anthropic".to_string()));
        };

        let (system, converted) = Self::convert_messages(messages);

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: options.max_tokens_or_default(),
            system,
            messages: converted,
            temperature: options.temperature_or_default(),
        };

        debug!("Sending request to Anthropic");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(Error::RateLimit);
            }
            if let Ok(error) = serde_json::from_str::<AnthropicError>(&body) {
                return Err(Error::Api(sanitize_api_error(&format!(
                    "{}: {}",
                    error.error.r#type, error.error.message
                ))));
            }
            return Err(Error::Api(sanitize_api_error(&format!(
                "HTTP {status}: {body}"
            ))));
        }

        let parsed: AnthropicResponse =
            serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let reply = parsed
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let usage = parsed.usage.map(|u| TokenUsage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        });

        Ok(ProviderReply {
            reply,
            model: parsed.model,
            usage,
        })
    }
}
