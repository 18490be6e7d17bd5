//! OpenAI - GPT chat-completions provider
//!
//! This module implements the OpenAI provider using reqwest.

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

/// Sanitize OpenAI API error messages to prevent leaking sensitive information
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("invalid key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Please check your OPENAI_API_KEY.".to_string();
    }

    if lower.contains("rate limit") || lower.contains("quota") {
        return "OpenAI rate limit exceeded. Please try again later.".to_string();
    }

    if lower.contains("internal") || lower.contains("server error") {
        return "OpenAI server error. Please try again later.".to_string();
    }

    if error.len() > 300 {
        format!("{}...(truncated)", crate::util::truncate_safe(error, 300))
    } else {
        error.to_string()
    }
}

/// Default OpenAI model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// GPT-4o list price, USD per 1K tokens ($2.50/$10.00 per 1M)
const COST: ProviderCost = ProviderCost {
    input_per_1k: 0.0025,
    output_per_1k: 0.010,
};

/// Heuristic quality ranking among the configured vendors
const QUALITY_TIER: u8 = 8;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// OpenAI provider configuration
#[derive(Clone)]
pub struct OpenAiConfig {
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
impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_deref().map(mask_api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
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
    ///
    /// A missing `OPENAI_API_KEY` yields a disabled adapter rather
    /// than an error; routing filters it out.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
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

/// OpenAI GPT provider
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
    meta: ProviderMetadata,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let meta = ProviderMetadata {
            name: "openai",
            display_name: "OpenAI GPT-4o",
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
        Self::new(OpenAiConfig::from_env())
    }

    /// Flatten the conversation into the OpenAI message array, system
    /// content first as a single `system`-role entry
    fn convert_messages(messages: &[Message]) -> Vec<OpenAiMessage> {
        let (system, turns) = split_system(messages);

        let mut converted = Vec::with_capacity(turns.len() + 1);
        if let Some(system) = system {
            converted.push(OpenAiMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        for msg in turns {
            converted.push(OpenAiMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            });
        }
        converted
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiProvider {
    fn meta(&self) -> &ProviderMetadata {
        &self.meta
    }

    #[instrument(skip(self, messages, options), fields(model = %self.config.model))]
    async fn chat(&self, messages: &[Message], options: &CallOptions) -> Result<ProviderReply> {
        let Some(api_key) = &self.config.api_key else {
            return Err(Error::MissingCredential("openai".to_string()));
        };

        let request = OpenAiRequest {
            model: self.config.model.clone(),
            messages: Self::convert_messages(messages),
            max_tokens: options.max_tokens_or_default(),
            temperature: options.temperature_or_default(),
        };

        debug!("Sending request to OpenAI");

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
            if let Ok(error) = serde_json::from_str::<OpenAiError>(&body) {
                return Err(Error::Api(sanitize_api_error(&error.error.message)));
            }
            return Err(Error::Api(sanitize_api_error(&format!(
                "HTTP {status}: {body}"
            ))));
        }

        let parsed: OpenAiResponse =
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
