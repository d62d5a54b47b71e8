//! Common types used throughout VSS.
//!
//! This module contains the domain types (records, identifiers, attribute
//! values, neighbors) and the public request/response shapes exposed by the
//! engine API.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::index::{IndexAlgorithm, IndexParams};
use crate::metric::Metric;
use crate::query::SearchFilter;

// ============================================================================
// RecordId
// ============================================================================

/// Unique identifier for a catalog record and its vector.
///
/// Identifiers are opaque strings (e.g., `id:7`). Ordering is lexicographic
/// and is the deterministic tie-break for equal distances.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create a new record id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// AttrValue
// ============================================================================

/// A scalar attribute value on a catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrValue {
    /// Free text (e.g., a product description).
    Text(String),

    /// Numeric value (e.g., a price).
    Number(f64),

    /// Tag used for exact-match filtering (e.g., a category).
    Tag(String),
}

impl AttrValue {
    /// Get the text content, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the tag content, if this is a `Tag` value.
    pub fn as_tag(&self) -> Option<&str> {
        match self {
            Self::Tag(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Tag(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// A catalog record: an identifier plus an ordered attribute map.
///
/// Records are owned by the [`Catalog`](crate::catalog::Catalog); the vector
/// store references them by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier.
    pub id: RecordId,

    /// Ordered attribute name → value mapping.
    #[serde(default)]
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Record {
    /// Create a record with no attributes.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            attrs: BTreeMap::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    /// Set a text attribute.
    pub fn with_text(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_attr(name, AttrValue::Text(text.into()))
    }

    /// Set a numeric attribute.
    pub fn with_number(self, name: impl Into<String>, value: f64) -> Self {
        self.with_attr(name, AttrValue::Number(value))
    }

    /// Set a tag attribute.
    pub fn with_tag(self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.with_attr(name, AttrValue::Tag(tag.into()))
    }

    /// Get an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// Get a text attribute's content by name.
    pub fn text_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(AttrValue::as_text)
    }
}

// ============================================================================
// Neighbor
// ============================================================================

/// A single entry in a query result: record id and distance.
///
/// Distances are ascending-is-closer under every metric (squared L2, cosine
/// distance, negated inner product).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighbor {
    /// The matched record id.
    pub id: RecordId,

    /// Distance from the query vector.
    pub distance: f32,
}

impl Neighbor {
    /// Create a new neighbor.
    pub fn new(id: impl Into<RecordId>, distance: f32) -> Self {
        Self {
            id: id.into(),
            distance,
        }
    }
}

// ============================================================================
// RecordUpsert
// ============================================================================

/// A record plus its vector source, for ingestion.
///
/// When `vector` is `None`, the engine embeds the record's configured text
/// attribute via the embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUpsert {
    /// The catalog record.
    pub record: Record,

    /// Pre-computed vector; embedded from text when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
}

impl RecordUpsert {
    /// Ingest a record, embedding its text attribute.
    pub fn from_record(record: Record) -> Self {
        Self {
            record,
            vector: None,
        }
    }

    /// Ingest a record with a pre-computed vector.
    pub fn with_vector(record: Record, vector: Vec<f32>) -> Self {
        Self {
            record,
            vector: Some(vector),
        }
    }
}

// ============================================================================
// Public surface: requests and responses
// ============================================================================

/// Default number of neighbors returned when a request omits `k`.
pub const DEFAULT_TOP_K: usize = 8;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// Request to create (or rebuild and atomically replace) a named index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexRequest {
    /// Name under which the index is published.
    pub index_name: String,

    /// Distance metric; engine default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,

    /// Search algorithm; engine default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<IndexAlgorithm>,

    /// Build parameters for partitioned indexes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<IndexParams>,
}

impl CreateIndexRequest {
    /// Create a request with engine defaults for metric and algorithm.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            metric: None,
            algorithm: None,
            params: None,
        }
    }

    /// Set the metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Set the algorithm.
    pub fn with_algorithm(mut self, algorithm: IndexAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Set the build parameters.
    pub fn with_params(mut self, params: IndexParams) -> Self {
        self.params = Some(params);
        self
    }
}

/// Request to drop a named index. Dropping an unknown name is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropIndexRequest {
    /// Name of the index to drop.
    pub index_name: String,
}

/// Response to a drop request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropIndexResponse {
    /// Whether an index was actually removed.
    pub dropped: bool,
}

/// A KNN query against a named index.
///
/// Exactly one of `vector` and `text` must be set; `text` requires an
/// embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Name of the index to query.
    pub index_name: String,

    /// Query vector (must match the index dimension).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,

    /// Text to embed into the query vector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Number of neighbors to return; clamped to the index population.
    #[serde(default = "default_top_k")]
    pub k: usize,

    /// Optional attribute filter, applied before ranking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchFilter>,

    /// Number of partitions to probe (partitioned indexes only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nprobe: Option<usize>,
}

impl QueryRequest {
    /// Create a vector query.
    pub fn by_vector(index_name: impl Into<String>, vector: Vec<f32>, k: usize) -> Self {
        Self {
            index_name: index_name.into(),
            vector: Some(vector),
            text: None,
            k,
            filter: None,
            nprobe: None,
        }
    }

    /// Create a text query (requires an embedding provider).
    pub fn by_text(index_name: impl Into<String>, text: impl Into<String>, k: usize) -> Self {
        Self {
            index_name: index_name.into(),
            vector: None,
            text: Some(text.into()),
            k,
            filter: None,
            nprobe: None,
        }
    }

    /// Set the attribute filter.
    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the probe count.
    pub fn with_nprobe(mut self, nprobe: usize) -> Self {
        self.nprobe = Some(nprobe);
        self
    }
}

/// Response to a KNN query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// The queried index name.
    pub index_name: String,

    /// The index dimension (0 for an empty index).
    pub dim: usize,

    /// The index metric.
    pub metric: Metric,

    /// Matches, ascending by distance, ties broken by id ascending.
    pub results: Vec<Neighbor>,
}

// ============================================================================
// Tests
// ============================================================================
