//! # vss-core
//!
//! **Vector Similarity Service** – core index and query engine.
//!
//! This crate provides a single-node vector-similarity engine: raw vectors
//! keyed by record id, immutable indexes built from point-in-time
//! snapshots, exact and approximate KNN queries with attribute filters, and
//! a registry that publishes rebuilt indexes atomically.
//!
//! ## Main Types
//!
//! - [`VssEngine`] – the main entry point for all VSS operations
//! - [`VectorStore`] – raw vectors keyed by record id
//! - [`IndexManager`] – named-index registry with atomic publish
//! - [`QueryEngine`] – KNN ranking over immutable indexes
//! - [`VssError`] – domain-specific error type
//!
//! ## Distance Conventions
//!
//! All metrics are distances (ascending means closer): squared L2, cosine
//! distance `1 − cos`, and negated inner product. See [`metric`] for the
//! rationale; no square root is taken on the hot path.
//!
//! ## Concurrency
//!
//! Many concurrent readers, one mutator at a time per named index. Index
//! rebuilds construct the new structure entirely outside the registry lock
//! and publish by `Arc` swap: queries in flight finish against the index
//! they started with, and a replaced name never transiently disappears.
//!
//! ## Example
//!
//! ```ignore
//! use vss_core::{CreateIndexRequest, QueryRequest, Record, RecordUpsert, VssEngine};
//!
//! let engine = VssEngine::with_defaults();
//!
//! let record = Record::new("id:1").with_tag("Category", "Purse");
//! engine.upsert_record(RecordUpsert::with_vector(record, vec![0.0, 0.0]))?;
//!
//! engine.create_index(&CreateIndexRequest::new("products"))?;
//! let response = engine.query(&QueryRequest::by_vector("products", vec![0.0, 0.0], 2))?;
//! println!("{} matches", response.results.len());
//! ```

// Modules
pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod index;
pub mod manager;
pub mod metric;
pub mod query;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use catalog::Catalog;
pub use config::{
    IndexDefaults, SearchDefaults, VssConfig, CONFIG_FILENAME, DEFAULT_TEXT_ATTRIBUTE,
    VSS_HOME_DIR,
};
pub use engine::{EngineStats, VssEngine};
pub use errors::VssError;
pub use index::{
    FlatIndex, Index, IndexAlgorithm, IndexBuilder, IndexInfo, IndexParams, IvfFlatIndex,
    SearchStructure, DEFAULT_KMEANS_ITERATIONS, DEFAULT_PARTITIONS,
};
pub use manager::IndexManager;
pub use metric::Metric;
pub use query::{QueryEngine, SearchFilter, SearchOptions, DEFAULT_NPROBE};
pub use store::{StoreSnapshot, VectorStore};
pub use types::{
    AttrValue, CreateIndexRequest, DropIndexRequest, DropIndexResponse, Neighbor, QueryRequest,
    QueryResponse, Record, RecordId, RecordUpsert, DEFAULT_TOP_K,
};

// vss-embed re-exports - the embedding boundary consumed by the engine
pub use vss_embed::{
    create_provider, EmbedConfig, EmbedError, EmbeddingProvider, MockEmbeddingProvider,
    ProviderKind,
};
