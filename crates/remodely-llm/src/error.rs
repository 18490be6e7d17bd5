//! Error types for remodely-llm

use thiserror::Error;

/// LLM error type
///
/// Errors are the adapter-to-orchestrator contract only: the
/// orchestrator catches every variant, records it in the response
/// error chain, and never lets one escape its public operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider has no usable credential configured
    #[error("no credential configured for provider: {0}")]
    MissingCredential(String),

    /// The vendor rejected the call
    #[error("api error: {0}")]
    Api(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit,

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be parsed
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Deadline elapsed before the provider answered
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
