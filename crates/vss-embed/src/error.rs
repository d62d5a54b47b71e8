//! Error types for vss-embed.
//!
//! Provider failures are surfaced to the ingestion path, which decides
//! whether to retry or fail the record. The index engine never sees them.

use thiserror::Error;

/// Result type alias for vss-embed operations.
pub type EmbedResult<T> = Result<T, EmbedError>;

/// Errors that can occur while generating embeddings.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The provider is not reachable, not configured, or not compiled in.
    #[error("Embedding provider `{provider}` is unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    /// The provider rejected the request due to rate limiting.
    #[error("Embedding provider rate limited{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// The provider returned a response that could not be interpreted.
    #[error("Invalid embedding response: {message}")]
    InvalidResponse { message: String },

    /// The provider returned a vector of unexpected length.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbedError {
    /// Create a provider unavailable error.
    pub fn unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(" (retry after {}s)", secs),
        None => String::new(),
    }
}
