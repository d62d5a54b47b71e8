//! Remote HTTP embedding provider (OpenAI-compatible embeddings API).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{EmbedConfig, ProviderKind};
use crate::error::{EmbedError, EmbedResult};
use crate::provider::EmbeddingProvider;

/// Request timeout for embedding calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

// ============================================================================
// RemoteEmbeddingProvider
// ============================================================================

/// Embedding provider backed by an OpenAI-compatible HTTP endpoint.
///
/// Sends `POST {endpoint}/embeddings` with `{ "model": ..., "input": [...] }`
/// and expects `{ "data": [{ "embedding": [...] }] }` back. HTTP 429 maps to
/// [`EmbedError::RateLimited`]; everything else that fails maps to
/// [`EmbedError::ProviderUnavailable`].
pub struct RemoteEmbeddingProvider {
    endpoint: String,
    model: String,
    dimension: usize,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl RemoteEmbeddingProvider {
    /// Create a remote provider from configuration.
    ///
    /// The API key is read from the environment variable named in
    /// `config.api_key_env`; a missing key is allowed (some gateways
    /// authenticate by network instead).
    pub fn from_config(config: &EmbedConfig) -> EmbedResult<Self> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            EmbedError::unavailable(
                "remote",
                "no endpoint configured (set embedding.endpoint in config)",
            )
        })?;

        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            warn!(
                "No API key found in ${}; sending unauthenticated requests",
                config.api_key_env
            );
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EmbedError::unavailable("remote", e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimension: config.dimension,
            api_key,
            client,
        })
    }

    fn request(&self, texts: &[&str]) -> EmbedResult<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.endpoint);
        debug!("Requesting {} embeddings from {}", texts.len(), url);

        let mut request = self.client.post(&url).json(&EmbeddingsRequest {
            model: &self.model,
            input: texts.to_vec(),
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .map_err(|e| EmbedError::unavailable("remote", e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(EmbedError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(EmbedError::unavailable(
                "remote",
                format!("HTTP {} from {}", status, url),
            ));
        }

        let body: EmbeddingsResponse = response
            .json()
            .map_err(|e| EmbedError::invalid_response(e.to_string()))?;

        if body.data.len() != texts.len() {
            return Err(EmbedError::invalid_response(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        let mut vectors = Vec::with_capacity(body.data.len());
        for datum in body.data {
            if datum.embedding.len() != self.dimension {
                return Err(EmbedError::DimensionMismatch {
                    expected: self.dimension,
                    actual: datum.embedding.len(),
                });
            }
            vectors.push(datum.embedding);
        }
        Ok(vectors)
    }
}

impl EmbeddingProvider for RemoteEmbeddingProvider {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Remote
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> EmbedResult<Vec<f32>> {
        let mut vectors = self.request(&[text])?;
        Ok(vectors.remove(0))
    }

    fn embed_batch(&self, texts: &[&str]) -> EmbedResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_endpoint() {
        let config = EmbedConfig::default();
        let err = RemoteEmbeddingProvider::from_config(&config).unwrap_err();
        assert!(matches!(err, EmbedError::ProviderUnavailable { .. }));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let config = EmbedConfig::default().with_endpoint("https://example.test/v1/");
        let provider = RemoteEmbeddingProvider::from_config(&config).unwrap();
        assert_eq!(provider.endpoint, "https://example.test/v1");
    }
}
