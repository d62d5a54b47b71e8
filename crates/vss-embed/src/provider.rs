//! Embedding provider trait and the deterministic mock provider.

use tracing::debug;

use crate::config::{EmbedConfig, ProviderKind};
use crate::error::{EmbedError, EmbedResult};

// ============================================================================
// EmbeddingProvider trait
// ============================================================================

/// Trait for embedding providers.
///
/// Implementors map text to fixed-length `f32` vectors. Every vector returned
/// by one provider instance has exactly [`dimension`](Self::dimension)
/// components.
pub trait EmbeddingProvider: Send + Sync {
    /// Get the provider kind.
    fn provider_kind(&self) -> ProviderKind;

    /// Get the dimension of vectors produced by this provider.
    fn dimension(&self) -> usize;

    /// Embed a single text into a vector.
    fn embed(&self, text: &str) -> EmbedResult<Vec<f32>>;

    /// Embed a batch of texts.
    ///
    /// The default implementation embeds one at a time; providers with a
    /// batch API should override this.
    fn embed_batch(&self, texts: &[&str]) -> EmbedResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Create an embedding provider from configuration.
///
/// # Errors
///
/// Returns [`EmbedError::ProviderUnavailable`] if the configured provider is
/// unknown, or if the `remote` provider is requested without the `remote`
/// feature compiled in or without an endpoint configured.
pub fn create_provider(config: &EmbedConfig) -> EmbedResult<Box<dyn EmbeddingProvider>> {
    debug!("Creating embedding provider: {}", config.provider);

    match &config.provider {
        ProviderKind::Mock => Ok(Box::new(MockEmbeddingProvider::new(config.dimension))),

        #[cfg(feature = "remote")]
        ProviderKind::Remote => {
            let provider = crate::remote::RemoteEmbeddingProvider::from_config(config)?;
            Ok(Box::new(provider))
        }

        #[cfg(not(feature = "remote"))]
        ProviderKind::Remote => Err(EmbedError::unavailable(
            "remote",
            "vss-embed was compiled without the `remote` feature",
        )),

        ProviderKind::Other(name) => Err(EmbedError::unavailable(
            name.clone(),
            "unknown embedding provider",
        )),
    }
}

// ============================================================================
// MockEmbeddingProvider
// ============================================================================

/// Deterministic embedding provider for tests and offline demos.
///
/// Produces a unit-normalized vector derived from the text bytes via an
/// FNV-1a hash feeding a small LCG. Identical texts always embed to
/// identical vectors; distinct texts embed to (almost certainly) distinct
/// directions. Never selected implicitly at runtime.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    /// Create a mock provider producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingProvider for MockEmbeddingProvider {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> EmbedResult<Vec<f32>> {
        // FNV-1a over the text bytes seeds the generator.
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }

        let mut vector = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            // Map the top 24 bits into [-1, 1).
            let unit = (state >> 40) as f32 / (1u64 << 23) as f32 - 1.0;
            vector.push(unit);
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        Ok(vector)
    }
}

// ============================================================================
// Tests
// ============================================================================
