//! Embedding provider configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Default embedding model / deployment name.
pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";

/// Default embedding dimension for the default model.
pub const DEFAULT_DIMENSION: usize = 1536;

/// Environment variable consulted for the remote API key.
pub const API_KEY_ENV: &str = "VSS_EMBED_API_KEY";

// ============================================================================
// ProviderKind
// ============================================================================

/// Supported embedding provider backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Remote OpenAI-compatible HTTP endpoint (default).
    #[default]
    Remote,

    /// Deterministic mock provider for tests and offline demos.
    ///
    /// Never selected implicitly; must be configured explicitly.
    Mock,

    /// Other/custom provider (for extensibility).
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Mock => write!(f, "mock"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "remote" | "http" | "openai" => Self::Remote,
            "mock" => Self::Mock,
            other => Self::Other(other.to_string()),
        })
    }
}

// ============================================================================
// EmbedConfig
// ============================================================================

/// Configuration for an embedding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedConfig {
    /// The provider backend to use.
    #[serde(default)]
    pub provider: ProviderKind,

    /// Model or deployment name sent to the remote endpoint.
    #[serde(default = "default_model")]
    pub model: String,

    /// Vector dimension produced by the model.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Remote endpoint base URL (e.g., `https://api.example.com/v1`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_dimension() -> usize {
    DEFAULT_DIMENSION
}

fn default_api_key_env() -> String {
    API_KEY_ENV.to_string()
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Remote,
            model: default_model(),
            dimension: default_dimension(),
            endpoint: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl EmbedConfig {
    /// Create a config for the given provider kind.
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Create a mock-provider config with the given dimension.
    pub fn mock(dimension: usize) -> Self {
        Self {
            provider: ProviderKind::Mock,
            dimension,
            ..Self::default()
        }
    }

    /// Set the model or deployment name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the vector dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the remote endpoint base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
