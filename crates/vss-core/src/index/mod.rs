//! Immutable index structures for vector search.
//!
//! This module provides:
//! - [`IndexAlgorithm`] - enum of supported search structures
//! - [`IndexParams`] - build parameters for partitioned indexes
//! - [`SearchStructure`] - trait implemented by every search structure
//! - [`Index`] - an immutable, published snapshot of the vector store
//! - [`IndexInfo`] - summary of a published index
//! - [`IndexBuilder`] - pure snapshot → [`Index`] construction
//!
//! An [`Index`] is never mutated in place: rebuilds produce a new value that
//! the [`IndexManager`](crate::manager::IndexManager) swaps in atomically.

mod builder;
mod flat;
mod ivf;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metric::Metric;
use crate::types::RecordId;

pub use builder::IndexBuilder;
pub use flat::FlatIndex;
pub use ivf::IvfFlatIndex;

// ============================================================================
// IndexAlgorithm
// ============================================================================

/// Supported index search structures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexAlgorithm {
    /// Exact search: linear scan over all vectors (default).
    #[default]
    Flat,

    /// Approximate search: k-means partitions, probe the nearest buckets.
    ///
    /// Trades recall for speed; single-probe searches may miss neighbors
    /// that fall in unprobed partitions.
    IvfFlat,
}

impl IndexAlgorithm {
    /// Get the algorithm name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::IvfFlat => "ivf_flat",
        }
    }
}

impl fmt::Display for IndexAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IndexAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "ivf_flat" | "ivf" | "partitioned" => Ok(Self::IvfFlat),
            other => Err(format!("Unknown index algorithm: {}", other)),
        }
    }
}

// ============================================================================
// IndexParams
// ============================================================================

/// Default number of partitions for IVF indexes.
pub const DEFAULT_PARTITIONS: usize = 8;

/// Default number of Lloyd iterations for centroid training.
pub const DEFAULT_KMEANS_ITERATIONS: usize = 8;

/// Build parameters for partitioned indexes. Ignored by flat builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexParams {
    /// Number of k-means partitions (clamped to the population).
    #[serde(default = "default_partitions")]
    pub partitions: usize,

    /// Number of Lloyd iterations when training centroids.
    #[serde(default = "default_kmeans_iterations")]
    pub kmeans_iterations: usize,
}

fn default_partitions() -> usize {
    DEFAULT_PARTITIONS
}

fn default_kmeans_iterations() -> usize {
    DEFAULT_KMEANS_ITERATIONS
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            partitions: DEFAULT_PARTITIONS,
            kmeans_iterations: DEFAULT_KMEANS_ITERATIONS,
        }
    }
}

impl IndexParams {
    /// Set the partition count.
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    /// Set the Lloyd iteration count.
    pub fn with_kmeans_iterations(mut self, iterations: usize) -> Self {
        self.kmeans_iterations = iterations;
        self
    }
}

// ============================================================================
// SearchStructure trait
// ============================================================================

/// Trait implemented by every index search structure.
///
/// A structure stores rows (id + vector) and nominates candidate rows for a
/// query. The flat structure nominates every row; partitioned structures
/// nominate only the probed buckets' union. Distance ranking itself lives in
/// the [`QueryEngine`](crate::query::QueryEngine) so every structure ranks
/// identically.
pub trait SearchStructure: Send + Sync {
    /// Number of rows in the structure.
    fn len(&self) -> usize;

    /// Check if the structure holds no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The record id stored at `row`.
    fn record_id(&self, row: u32) -> &RecordId;

    /// The vector stored at `row`.
    fn vector(&self, row: u32) -> &[f32];

    /// Rows to rank for `query`, probing up to `nprobe` partitions.
    ///
    /// `nprobe` is advisory for exact structures.
    fn candidate_rows(&self, query: &[f32], nprobe: usize) -> Vec<u32>;
}

// ============================================================================
// Index
// ============================================================================

/// An immutable index: a search structure plus its metric and provenance.
///
/// Built wholesale from a [`StoreSnapshot`](crate::store::StoreSnapshot) and
/// never mutated; the manager replaces it by atomic swap.
pub struct Index {
    dim: usize,
    metric: Metric,
    algorithm: IndexAlgorithm,
    built_at: DateTime<Utc>,
    structure: Box<dyn SearchStructure>,
}

impl Index {
    pub(crate) fn new(
        dim: usize,
        metric: Metric,
        algorithm: IndexAlgorithm,
        structure: Box<dyn SearchStructure>,
    ) -> Self {
        Self {
            dim,
            metric,
            algorithm,
            built_at: Utc::now(),
            structure,
        }
    }

    /// The vector dimension (0 for an index built from an empty snapshot).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The distance metric.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// The search algorithm.
    pub fn algorithm(&self) -> IndexAlgorithm {
        self.algorithm
    }

    /// When this index was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.structure.len()
    }

    /// Check if the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.structure.is_empty()
    }

    /// The record id stored at `row`.
    pub fn record_id(&self, row: u32) -> &RecordId {
        self.structure.record_id(row)
    }

    /// The vector stored at `row`.
    pub fn vector(&self, row: u32) -> &[f32] {
        self.structure.vector(row)
    }

    /// Rows to rank for `query`; see [`SearchStructure::candidate_rows`].
    pub fn candidate_rows(&self, query: &[f32], nprobe: usize) -> Vec<u32> {
        self.structure.candidate_rows(query, nprobe)
    }

    /// Summarize this index under the given published name.
    pub fn info(&self, name: impl Into<String>) -> IndexInfo {
        IndexInfo {
            name: name.into(),
            dim: self.dim,
            metric: self.metric,
            algorithm: self.algorithm,
            count: self.len(),
            built_at: self.built_at,
        }
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("dim", &self.dim)
            .field("metric", &self.metric)
            .field("algorithm", &self.algorithm)
            .field("count", &self.len())
            .field("built_at", &self.built_at)
            .finish()
    }
}

// ============================================================================
// IndexInfo
// ============================================================================

/// Summary of a published index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    /// Published name.
    pub name: String,

    /// Vector dimension (0 for an empty index).
    pub dim: usize,

    /// Distance metric.
    pub metric: Metric,

    /// Search algorithm.
    pub algorithm: IndexAlgorithm,

    /// Number of indexed vectors.
    pub count: usize,

    /// Build timestamp.
    pub built_at: DateTime<Utc>,
}

// ============================================================================
// Tests
// ============================================================================
