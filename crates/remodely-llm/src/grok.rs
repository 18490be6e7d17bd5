//! Grok - xAI provider
//!
//! xAI exposes an OpenAI-compatible chat-completions API, so the wire
//! codec mirrors the OpenAI adapter; only auth env vars, base URL, and
//! metadata differ.

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

/// Sanitize xAI API error messages to prevent leaking sensitive information
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("invalid key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Please check your XAI_API_KEY.".to_string();
    }

    if lower.contains("rate limit") || lower.contains("quota") {
        return "xAI rate limit exceeded. Please try again later.".to_string();
    }

    if lower.contains("internal") || lower.contains("server error") {
        return "xAI server error. Please try again later.".to_string();
    }

    if error.len() > 300 {
        format!("{}...(truncated)", crate::util::truncate_safe(error, 300))
    } else {
        error.to_string()
    }
}

/// Default Grok model
pub const DEFAULT_MODEL: &str = "grok-2-latest";

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

/// Grok 2 list price, USD per 1K tokens ($2.00/$10.00 per 1M)
const COST: ProviderCost = ProviderCost {
    input_per_1k: 0.002,
    output_per_1k: 0.010,
};

/// Heuristic quality ranking among the configured vendors
const QUALITY_TIER: u8 = 6;

// OpenAI-compatible request/response types
#[derive(Debug, Serialize)]
struct GrokRequest {
    model: String,
    messages: Vec<GrokMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GrokMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct GrokResponse {
    model: String,
    choices: Vec<GrokChoice>,
    usage: Option<GrokUsage>,
}

#[derive(Debug, Deserialize)]
struct GrokChoice {
    message: GrokResponseMessage,
}

#[derive(Debug, Deserialize)]
struct GrokResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GrokUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

/// Grok provider configuration
#[derive(Clone)]
pub struct GrokConfig {
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
impl fmt::Debug for GrokConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrokConfig")
            .field("api_key", &self.api_key.as_deref().map(mask_api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GrokConfig {
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
            api_key: std::env::var("XAI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("XAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("GROK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
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

/// xAI Grok provider (OpenAI-compatible)
pub struct GrokProvider {
    client: Client,
    config: GrokConfig,
    meta: ProviderMetadata,
}

impl GrokProvider {
    /// Create a new Grok provider
    pub fn new(config: GrokConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let meta = ProviderMetadata {
            name: "grok",
            display_name: "xAI Grok",
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
        Self::new(GrokConfig::from_env())
    }

    fn convert_messages(messages: &[Message]) -> Vec<GrokMessage> {
        let (system, turns) = split_system(messages);

        let mut converted = Vec::with_capacity(turns.len() + 1);
        if let Some(system) = system {
            converted.push(GrokMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        for msg in turns {
            converted.push(GrokMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            });
        }
        converted
    }
}

#[async_trait::async_trait]
impl ChatProvider for GrokProvider {
    fn meta(&self) -> &ProviderMetadata {
        &self.meta
    }

    #[instrument(skip(self, messages, options), fields(model = %self.config.model))]
    async fn chat(&self, messages: &[Message], options: &CallOptions) -> Result<ProviderReply> {
        let Some(api_key) = &self.config.api_key else {
            return Err(Error::MissingCredential("grok".to_string()));
        };

        let request = GrokRequest {
            model: self.config.model.clone(),
            messages: Self::convert_messages(messages),
            max_tokens: options.max_tokens_or_default(),
            temperature: options.temperature_or_default(),
        };

        debug!("Sending request to xAI");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
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
            return Err(Error::Api(sanitize_api_error(&format!(
                "HTTP {status}: {body}"
            ))));
        }

        let parsed: GrokResponse =
            serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let reply = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let usage = parsed.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        Ok(ProviderReply {
            reply,
            model: parsed.model,
            usage,
        })
    }
}
