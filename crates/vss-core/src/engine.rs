//! VSS engine – the orchestrator over catalog, store, indexes, and queries.
//!
//! [`VssEngine`] is the main entry point. It wires the ingestion path
//! (attributes to the catalog, vectors to the store, text through the
//! embedding provider) to the index lifecycle (snapshot → build → atomic
//! publish) and the query surface.

use std::sync::Arc;

use tracing::debug;
use vss_embed::{create_provider, EmbedError, EmbeddingProvider};

use crate::catalog::Catalog;
use crate::config::VssConfig;
use crate::errors::VssError;
use crate::index::IndexInfo;
use crate::manager::IndexManager;
use crate::query::{QueryEngine, SearchFilter, SearchOptions};
use crate::store::{StoreSnapshot, VectorStore};
use crate::types::{
    CreateIndexRequest, DropIndexRequest, DropIndexResponse, QueryRequest, QueryResponse, Record,
    RecordId, RecordUpsert,
};

use serde::{Deserialize, Serialize};

// ============================================================================
// VssEngine
// ============================================================================

/// The main engine for VSS operations.
///
/// Owns the [`Catalog`], [`VectorStore`], and [`IndexManager`]; holds an
/// optional [`EmbeddingProvider`] for text ingestion and text queries.
/// Vector-only workloads never need a provider; text operations against an
/// engine without one fail with an actionable error rather than falling
/// back silently.
pub struct VssEngine {
    catalog: Arc<Catalog>,
    store: VectorStore,
    manager: IndexManager,
    query_engine: QueryEngine,
    embedder: Option<Box<dyn EmbeddingProvider>>,
    config: VssConfig,
}

impl VssEngine {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create an engine without an embedding provider (vector-only).
    pub fn new(config: VssConfig) -> Self {
        let catalog = Arc::new(Catalog::new());
        Self {
            query_engine: QueryEngine::new(Arc::clone(&catalog)),
            catalog,
            store: VectorStore::new(),
            manager: IndexManager::new(),
            embedder: None,
            config,
        }
    }

    /// Create an engine with the provider described by the configuration.
    ///
    /// Fails fast when the configured provider cannot be constructed.
    pub fn from_config(config: VssConfig) -> Result<Self, VssError> {
        let provider = create_provider(&config.embedding)?;
        Ok(Self::with_embedder(config, provider))
    }

    /// Create an engine with an explicit embedding provider.
    pub fn with_embedder(config: VssConfig, embedder: Box<dyn EmbeddingProvider>) -> Self {
        let mut engine = Self::new(config);
        engine.embedder = Some(embedder);
        engine
    }

    /// Create an engine with built-in defaults and no provider.
    pub fn with_defaults() -> Self {
        Self::new(VssConfig::default())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The engine configuration.
    pub fn config(&self) -> &VssConfig {
        &self.config
    }

    /// The attribute catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The vector store.
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// The index registry.
    pub fn manager(&self) -> &IndexManager {
        &self.manager
    }

    // -------------------------------------------------------------------------
    // Ingestion
    // -------------------------------------------------------------------------

    /// Ingest a record: attributes into the catalog, vector into the store.
    ///
    /// When the upsert carries no vector, the record's configured text
    /// attribute is embedded via the provider. Provider failures fail this
    /// record only; published indexes are untouched.
    pub fn upsert_record(&self, upsert: RecordUpsert) -> Result<(), VssError> {
        let RecordUpsert { record, vector } = upsert;

        let vector = match vector {
            Some(vector) => vector,
            None => self.embed_record_text(&record)?,
        };

        // Store first: a dimension mismatch must not leave a half-ingested
        // record in the catalog.
        self.store.upsert(record.id.clone(), vector)?;
        self.catalog.upsert(record)?;
        Ok(())
    }

    /// Remove a record from the catalog and the store. Tolerant no-op when
    /// absent; returns whether anything was removed.
    pub fn remove_record(&self, id: &RecordId) -> Result<bool, VssError> {
        let had_vector = self.store.delete(id)?;
        let had_record = self.catalog.delete(id)?;
        Ok(had_vector || had_record)
    }

    /// Take a consistent snapshot of the vector store.
    pub fn snapshot(&self) -> Result<StoreSnapshot, VssError> {
        self.store.snapshot()
    }

    fn embed_record_text(&self, record: &Record) -> Result<Vec<f32>, VssError> {
        let attr = &self.config.text_attribute;
        let text = record.text_attr(attr).ok_or_else(|| {
            VssError::invalid_argument(format!(
                "record `{}` has no vector and no `{}` text attribute",
                record.id, attr
            ))
        })?;
        Ok(self.embedder()?.embed(text)?)
    }

    fn embedder(&self) -> Result<&dyn EmbeddingProvider, VssError> {
        self.embedder
            .as_deref()
            .ok_or_else(|| {
                VssError::Embedding(EmbedError::unavailable(
                    "none",
                    "no embedding provider configured (set embedding.provider in config)",
                ))
            })
    }

    // -------------------------------------------------------------------------
    // Index lifecycle
    // -------------------------------------------------------------------------

    /// Build an index over the current store contents and publish it,
    /// atomically replacing any prior index with the same name.
    pub fn create_index(&self, request: &CreateIndexRequest) -> Result<IndexInfo, VssError> {
        let snapshot = self.store.snapshot()?;
        let metric = request.metric.unwrap_or(self.config.index.metric);
        let algorithm = request.algorithm.unwrap_or(self.config.index.algorithm);
        let params = request.params.unwrap_or(self.config.index.params);
        self.manager
            .create_or_replace(&request.index_name, &snapshot, metric, algorithm, &params)
    }

    /// Drop a named index. Tolerant no-op when absent.
    pub fn drop_index(&self, request: &DropIndexRequest) -> Result<DropIndexResponse, VssError> {
        let dropped = self.manager.drop_index(&request.index_name)?;
        Ok(DropIndexResponse { dropped })
    }

    /// Summaries of all published indexes.
    pub fn list_indexes(&self) -> Result<Vec<IndexInfo>, VssError> {
        self.manager.list()
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Run a KNN query against a named index.
    ///
    /// Exactly one of `vector` and `text` must be set; `text` is embedded
    /// via the provider.
    pub fn query(&self, request: &QueryRequest) -> Result<QueryResponse, VssError> {
        let vector = match (&request.vector, &request.text) {
            (Some(_), Some(_)) => {
                return Err(VssError::invalid_argument(
                    "query must set exactly one of `vector` and `text`, not both",
                ))
            }
            (None, None) => {
                return Err(VssError::invalid_argument(
                    "query must set one of `vector` and `text`",
                ))
            }
            (Some(vector), None) => vector.clone(),
            (None, Some(text)) => self.embedder()?.embed(text)?,
        };

        self.search(
            &request.index_name,
            &vector,
            request.k,
            request.filter.clone(),
            request.nprobe,
        )
    }

    /// Find records similar to an already-ingested record, using its stored
    /// vector as the query. The record itself ranks first at distance 0.
    pub fn query_like(
        &self,
        index_name: &str,
        id: &RecordId,
        k: usize,
        filter: Option<SearchFilter>,
        nprobe: Option<usize>,
    ) -> Result<QueryResponse, VssError> {
        let vector = self.store.get(id)?;
        self.search(index_name, &vector, k, filter, nprobe)
    }

    fn search(
        &self,
        index_name: &str,
        vector: &[f32],
        k: usize,
        filter: Option<SearchFilter>,
        nprobe: Option<usize>,
    ) -> Result<QueryResponse, VssError> {
        let index = self.manager.get(index_name)?;

        let mut opts = SearchOptions::new(k).with_nprobe(nprobe.unwrap_or(self.config.search.nprobe));
        if let Some(filter) = filter {
            opts = opts.with_filter(filter);
        }

        debug!("Query `{}`: k={}, nprobe={}", index_name, opts.k, opts.nprobe);
        let results = self.query_engine.search(&index, vector, &opts)?;
        Ok(QueryResponse {
            index_name: index_name.to_string(),
            dim: index.dim(),
            metric: index.metric(),
            results,
        })
    }

    // -------------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------------

    /// Engine-wide counters and index summaries.
    pub fn stats(&self) -> Result<EngineStats, VssError> {
        Ok(EngineStats {
            records: self.catalog.len()?,
            vectors: self.store.len()?,
            dimension: self.store.dimension()?,
            indexes: self.manager.list()?,
        })
    }
}

// ============================================================================
// EngineStats
// ============================================================================

/// Snapshot of engine-wide state for status reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    /// Number of catalog records.
    pub records: usize,

    /// Number of stored vectors.
    pub vectors: usize,

    /// Established store dimension, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,

    /// Published indexes, sorted by name.
    pub indexes: Vec<IndexInfo>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexAlgorithm;
    use crate::metric::Metric;
    use vss_embed::MockEmbeddingProvider;

    fn engine_with_mock(dim: usize) -> VssEngine {
        VssEngine::with_embedder(
            VssConfig::default(),
            Box::new(MockEmbeddingProvider::new(dim)),
        )
    }

    fn vector_upsert(id: &str, vector: Vec<f32>) -> RecordUpsert {
        RecordUpsert::with_vector(Record::new(id), vector)
    }

    #[test]
    fn test_ingest_and_query_by_vector() {
        let engine = VssEngine::with_defaults();
        engine.upsert_record(vector_upsert("a", vec![0.0, 0.0])).unwrap();
        engine.upsert_record(vector_upsert("b", vec![1.0, 0.0])).unwrap();
        engine.upsert_record(vector_upsert("c", vec![3.0, 4.0])).unwrap();

        engine
            .create_index(&CreateIndexRequest::new("products").with_metric(Metric::L2))
            .unwrap();

        let response = engine
            .query(&QueryRequest::by_vector("products", vec![0.0, 0.0], 2))
            .unwrap();
        assert_eq!(response.dim, 2);
        assert_eq!(response.metric, Metric::L2);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].id.as_str(), "a");
        assert_eq!(response.results[0].distance, 0.0);
        assert_eq!(response.results[1].id.as_str(), "b");
        assert_eq!(response.results[1].distance, 1.0);
    }

    #[test]
    fn test_ingest_text_requires_provider() {
        let engine = VssEngine::with_defaults();
        let upsert = RecordUpsert::from_record(
            Record::new("a").with_text("description", "A purse with top handle."),
        );
        let err = engine.upsert_record(upsert).unwrap_err();
        assert!(matches!(err, VssError::Embedding(_)));
    }

    #[test]
    fn test_ingest_text_with_mock_provider() {
        let engine = engine_with_mock(16);
        let upsert = RecordUpsert::from_record(
            Record::new("a").with_text("description", "A purse with top handle."),
        );
        engine.upsert_record(upsert).unwrap();
        assert_eq!(engine.store().dimension().unwrap(), Some(16));
    }

    #[test]
    fn test_ingest_without_text_attribute_fails() {
        let engine = engine_with_mock(16);
        let upsert = RecordUpsert::from_record(Record::new("a").with_tag("Category", "Purse"));
        let err = engine.upsert_record(upsert).unwrap_err();
        assert!(matches!(err, VssError::InvalidArgument(_)));
        // Nothing half-ingested.
        assert_eq!(engine.catalog().len().unwrap(), 0);
    }

    #[test]
    fn test_failed_vector_leaves_catalog_untouched() {
        let engine = VssEngine::with_defaults();
        engine.upsert_record(vector_upsert("a", vec![0.0, 0.0])).unwrap();

        let bad = RecordUpsert::with_vector(
            Record::new("b").with_tag("Category", "Shoes"),
            vec![1.0, 2.0, 3.0],
        );
        let err = engine.upsert_record(bad).unwrap_err();
        assert!(matches!(err, VssError::DimensionMismatch { .. }));
        assert!(engine.catalog().get(&RecordId::new("b")).unwrap().is_none());
    }

    #[test]
    fn test_query_requires_exactly_one_input() {
        let engine = VssEngine::with_defaults();
        engine.upsert_record(vector_upsert("a", vec![0.0])).unwrap();
        engine.create_index(&CreateIndexRequest::new("idx")).unwrap();

        let mut both = QueryRequest::by_vector("idx", vec![0.0], 1);
        both.text = Some("hello".to_string());
        assert!(matches!(
            engine.query(&both).unwrap_err(),
            VssError::InvalidArgument(_)
        ));

        let neither = QueryRequest {
            index_name: "idx".to_string(),
            vector: None,
            text: None,
            k: 1,
            filter: None,
            nprobe: None,
        };
        assert!(matches!(
            engine.query(&neither).unwrap_err(),
            VssError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_query_unknown_index_fails() {
        let engine = VssEngine::with_defaults();
        let err = engine
            .query(&QueryRequest::by_vector("missing", vec![0.0], 1))
            .unwrap_err();
        assert!(matches!(err, VssError::IndexNotFound(_)));
    }

    #[test]
    fn test_drop_missing_index_is_noop() {
        let engine = VssEngine::with_defaults();
        let response = engine
            .drop_index(&DropIndexRequest {
                index_name: "missing".to_string(),
            })
            .unwrap();
        assert!(!response.dropped);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let engine = VssEngine::with_defaults();
        engine.upsert_record(vector_upsert("a", vec![0.0, 0.0])).unwrap();
        engine.upsert_record(vector_upsert("b", vec![1.0, 0.0])).unwrap();

        let request = CreateIndexRequest::new("idx");
        engine.create_index(&request).unwrap();
        let first = engine
            .query(&QueryRequest::by_vector("idx", vec![0.5, 0.0], 2))
            .unwrap();

        engine.create_index(&request).unwrap();
        let second = engine
            .query(&QueryRequest::by_vector("idx", vec![0.5, 0.0], 2))
            .unwrap();

        assert_eq!(first.results, second.results);
    }

    #[test]
    fn test_rebuild_picks_up_new_records() {
        let engine = VssEngine::with_defaults();
        engine.upsert_record(vector_upsert("a", vec![0.0, 0.0])).unwrap();
        engine.create_index(&CreateIndexRequest::new("idx")).unwrap();

        // New record is invisible until a rebuild publishes it.
        engine.upsert_record(vector_upsert("b", vec![0.1, 0.0])).unwrap();
        let before = engine
            .query(&QueryRequest::by_vector("idx", vec![0.0, 0.0], 5))
            .unwrap();
        assert_eq!(before.results.len(), 1);

        engine.create_index(&CreateIndexRequest::new("idx")).unwrap();
        let after = engine
            .query(&QueryRequest::by_vector("idx", vec![0.0, 0.0], 5))
            .unwrap();
        assert_eq!(after.results.len(), 2);
    }

    #[test]
    fn test_query_like_uses_stored_vector() {
        let engine = VssEngine::with_defaults();
        engine.upsert_record(vector_upsert("a", vec![0.0, 0.0])).unwrap();
        engine.upsert_record(vector_upsert("b", vec![1.0, 0.0])).unwrap();
        engine.create_index(&CreateIndexRequest::new("idx")).unwrap();

        let response = engine
            .query_like("idx", &RecordId::new("b"), 2, None, None)
            .unwrap();
        assert_eq!(response.results[0].id.as_str(), "b");
        assert_eq!(response.results[0].distance, 0.0);
        assert_eq!(response.results[1].id.as_str(), "a");

        let err = engine
            .query_like("idx", &RecordId::new("ghost"), 2, None, None)
            .unwrap_err();
        assert!(matches!(err, VssError::VectorNotFound(_)));
    }

    #[test]
    fn test_text_query_with_mock_provider() {
        let engine = engine_with_mock(16);
        for (id, text) in [
            ("id:1", "A purse with top handle."),
            ("id:2", "Vegan-leather boots."),
        ] {
            engine
                .upsert_record(RecordUpsert::from_record(
                    Record::new(id).with_text("description", text),
                ))
                .unwrap();
        }
        engine
            .create_index(&CreateIndexRequest::new("products").with_metric(Metric::Cosine))
            .unwrap();

        // The mock provider is deterministic: the same text embeds to the
        // same vector, so its record comes back at distance ~0.
        let response = engine
            .query(&QueryRequest::by_text("products", "Vegan-leather boots.", 1))
            .unwrap();
        assert_eq!(response.results[0].id.as_str(), "id:2");
        assert!(response.results[0].distance.abs() < 1e-5);
    }

    #[test]
    fn test_remove_record() {
        let engine = VssEngine::with_defaults();
        engine.upsert_record(vector_upsert("a", vec![0.0])).unwrap();
        assert!(engine.remove_record(&RecordId::new("a")).unwrap());
        assert!(!engine.remove_record(&RecordId::new("a")).unwrap());
        assert_eq!(engine.store().len().unwrap(), 0);
    }

    #[test]
    fn test_stats() {
        let engine = VssEngine::with_defaults();
        engine.upsert_record(vector_upsert("a", vec![0.0, 1.0])).unwrap();
        engine.create_index(&CreateIndexRequest::new("idx")).unwrap();

        let stats = engine.stats().unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.vectors, 1);
        assert_eq!(stats.dimension, Some(2));
        assert_eq!(stats.indexes.len(), 1);
        assert_eq!(stats.indexes[0].name, "idx");
    }

    #[test]
    fn test_ivf_defaults_from_config() {
        let mut config = VssConfig::default();
        config.index.algorithm = IndexAlgorithm::IvfFlat;
        config.index.params = config.index.params.with_partitions(2);
        let engine = VssEngine::new(config);

        for i in 0..6 {
            let offset = if i < 3 { 0.0 } else { 100.0 };
            engine
                .upsert_record(vector_upsert(
                    &format!("id:{}", i),
                    vec![offset + i as f32, offset],
                ))
                .unwrap();
        }
        let info = engine.create_index(&CreateIndexRequest::new("idx")).unwrap();
        assert_eq!(info.algorithm, IndexAlgorithm::IvfFlat);

        // Probing every partition matches flat search.
        let response = engine
            .query(
                &QueryRequest::by_vector("idx", vec![0.0, 0.0], 6).with_nprobe(2),
            )
            .unwrap();
        assert_eq!(response.results.len(), 6);
    }
}
