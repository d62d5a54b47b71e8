//! # vss-embed
//!
//! Embedding-provider boundary for VSS - text to vector inference.
//!
//! This crate is the **single source of truth** for embedding generation in
//! VSS. The index engine in `vss-core` treats embedding as an opaque
//! collaborator: text goes in, a fixed-length `f32` vector comes out, and
//! transient provider failures belong to the ingestion path, never to the
//! index.
//!
//! ## Design Principles
//!
//! 1. **Remote-first**: The production provider is a remote HTTP endpoint
//!    (OpenAI-compatible embeddings API), feature-gated behind `remote`.
//! 2. **No silent fallback**: The deterministic [`MockEmbeddingProvider`] is
//!    only used when explicitly configured (tests, offline demos). A missing
//!    or unreachable remote provider fails with an actionable error.
//! 3. **Provider-agnostic**: The [`EmbeddingProvider`] trait does not leak
//!    transport details.
//!
//! ## Features
//!
//! - `remote`: Remote inference via an OpenAI-compatible HTTP API.
//!
//! ## Usage
//!
//! ```ignore
//! use vss_embed::{create_provider, EmbedConfig};
//!
//! let config = EmbedConfig::default();
//! let provider = create_provider(&config)?;
//!
//! let vector = provider.embed("Vegan-leather boots.")?;
//! assert_eq!(vector.len(), provider.dimension());
//! ```

pub mod config;
pub mod error;
pub mod provider;

#[cfg(feature = "remote")]
mod remote;

// Re-export error types
pub use error::{EmbedError, EmbedResult};

// Re-export config types
pub use config::{EmbedConfig, ProviderKind, DEFAULT_DIMENSION, DEFAULT_MODEL};

// Re-export provider trait and implementations
pub use provider::{create_provider, EmbeddingProvider, MockEmbeddingProvider};

#[cfg(feature = "remote")]
pub use remote::RemoteEmbeddingProvider;
