//! Error types for vss-core.

use thiserror::Error;

/// Domain-specific errors for VSS operations.
///
/// Every failure is reported to the caller as a typed variant. The two
/// documented tolerant no-ops (`delete` on an absent key, `drop` on an
/// absent index) and the documented clamp (`k` above the index population)
/// are not errors.
#[derive(Error, Debug)]
pub enum VssError {
    /// A vector's length does not match the established dimension.
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension established by the store or index.
        expected: usize,
        /// The dimension of the offending vector.
        actual: usize,
    },

    /// A snapshot contains vectors of mixed lengths.
    #[error("Inconsistent vector dimensions in snapshot: record `{id}` has {actual} components, expected {expected}")]
    InconsistentDimension {
        /// The smallest-id record whose length disagrees.
        id: String,
        /// The dimension established by the first record in id order.
        expected: usize,
        /// The dimension of the offending record's vector.
        actual: usize,
    },

    /// The requested vector does not exist in the store.
    #[error("Vector not found: `{0}`")]
    VectorNotFound(String),

    /// The requested index name is not registered.
    #[error("Index not found: `{0}`")]
    IndexNotFound(String),

    /// Invalid argument provided to an operation (e.g., non-positive k).
    #[error("{0}")]
    InvalidArgument(String),

    /// A zero-norm vector cannot be ranked under the cosine metric.
    #[error("Zero-norm vector cannot be ranked by cosine distance: {subject}")]
    DegenerateVector {
        /// The record id, or `query vector` for the query itself.
        subject: String,
    },

    /// Configuration file error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// Embedding provider failure surfaced through the ingestion path.
    #[error(transparent)]
    Embedding(#[from] vss_embed::EmbedError),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal failure.
        message: String,
    },
}

impl VssError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a degenerate vector error for the query vector.
    pub fn degenerate_query() -> Self {
        Self::DegenerateVector {
            subject: "query vector".to_string(),
        }
    }

    /// Create a degenerate vector error for a stored record.
    pub fn degenerate_record(id: impl Into<String>) -> Self {
        Self::DegenerateVector {
            subject: format!("record `{}`", id.into()),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
