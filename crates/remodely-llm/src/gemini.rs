//! Gemini - Google Gemini API provider
//!
//! This module implements the Google Gemini provider using reqwest.
//! Gemini authenticates with a `?key=` query parameter, names the
//! assistant role `model`, and takes system content as a
//! `systemInstruction` field.

use crate::chat::{Message, MessageRole, TokenUsage};
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

/// Sanitize Gemini API error messages to prevent leaking sensitive information
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("invalid key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
        || lower.contains("permission denied")
    {
        return "API authentication error. Please check your GEMINI_API_KEY.".to_string();
    }

    if lower.contains("rate limit")
        || lower.contains("quota")
        || lower.contains("resource_exhausted")
    {
        return "Gemini rate limit exceeded. Please try again later.".to_string();
    }

    if lower.contains("internal") || lower.contains("server error") {
        return "Gemini server error. Please try again later.".to_string();
    }

    if error.len() > 300 {
        format!("{}...(truncated)", crate::util::truncate_safe(error, 300))
    } else {
        error.to_string()
    }
}

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini 1.5 Pro list price, USD per 1K tokens ($1.25/$5.00 per 1M)
const COST: ProviderCost = ProviderCost {
    input_per_1k: 0.00125,
    output_per_1k: 0.005,
};

/// Heuristic quality ranking among the configured vendors
const QUALITY_TIER: u8 = 7;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    /// May be absent for empty responses
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Gemini provider configuration
#[derive(Clone)]
pub struct GeminiConfig {
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
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_deref().map(mask_api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
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
    /// Prefers explicit `GEMINI_API_KEY`, falls back to the generic
    /// `GOOGLE_API_KEY` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());

        Self {
            api_key,
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
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

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    meta: ProviderMetadata,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let meta = ProviderMetadata {
            name: "gemini",
            display_name: "Google Gemini",
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
        Self::new(GeminiConfig::from_env())
    }

    /// Convert the conversation to Gemini format: system instruction
    /// split out, assistant turns renamed to `model`
    fn convert_messages(messages: &[Message]) -> (Option<GeminiContent>, Vec<GeminiContent>) {
        let (system, turns) = split_system(messages);

        let system_instruction = system.map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart { text }],
        });

        let contents = turns
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    MessageRole::Assistant => "model",
                    _ => "user",
                };
                GeminiContent {
                    role: Some(role.to_string()),
                    parts: vec![GeminiPart {
                        text: msg.content.clone(),
                    }],
                }
            })
            .collect();

        (system_instruction, contents)
    }
}

#[async_trait::async_trait]
impl ChatProvider for GeminiProvider {
    fn meta(&self) -> &ProviderMetadata {
        &self.meta
    }

    #[instrument(skip(self, messages, options), fields(model = %self.config.model))]
    async fn chat(&self, messages: &[Message], options: &CallOptions) -> Result<ProviderReply> {
        let Some(api_key) = &self.config.api_key else {
            return Err(Error::MissingCredential("gemini".to_string()));
        };

        let (system_instruction, contents) = Self::convert_messages(messages);

        let request = GeminiRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: options.temperature_or_default(),
                max_output_tokens: options.max_tokens_or_default(),
            },
        };

        debug!("Sending request to Gemini");

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key.as_str())])
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
            if let Ok(error) = serde_json::from_str::<GeminiError>(&body) {
                return Err(Error::Api(sanitize_api_error(&error.error.message)));
            }
            return Err(Error::Api(sanitize_api_error(&format!(
                "HTTP {status}: {body}"
            ))));
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let reply = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let usage = parsed.usage_metadata.map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        // Gemini does not echo the model name in the response body
        Ok(ProviderReply {
            reply,
            model: self.config.model.clone(),
            usage,
        })
    }
}
