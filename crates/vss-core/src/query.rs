//! KNN query execution over published indexes.
//!
//! The query engine is a pure reader: it ranks an index's candidate rows by
//! the index's metric, keeping the K smallest distances in a bounded heap
//! (O(N) time, O(K) extra space). Results are deterministic: equal
//! distances are broken by record id ascending.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::catalog::Catalog;
use crate::errors::VssError;
use crate::index::Index;
use crate::metric::{norm, Metric};
use crate::types::{AttrValue, Neighbor, Record, RecordId};

// ============================================================================
// SearchFilter
// ============================================================================

/// Attribute filter applied before distance ranking.
///
/// Conditions are equality checks against catalog attributes, combined with
/// AND logic. Candidates that fail the filter (or are missing from the
/// catalog) are excluded entirely and never count against K.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    /// Attribute name → required value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equals: Vec<(String, AttrValue)>,
}

impl SearchFilter {
    /// Create an empty filter (matches all).
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an attribute to equal a value.
    pub fn with_equals(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.equals.push((name.into(), value));
        self
    }

    /// Require a tag attribute to equal a value.
    pub fn with_tag(self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.with_equals(name, AttrValue::Tag(tag.into()))
    }

    /// Check if the filter is empty (matches all).
    pub fn is_empty(&self) -> bool {
        self.equals.is_empty()
    }

    /// Check whether a record satisfies every condition.
    pub fn matches(&self, record: &Record) -> bool {
        self.equals
            .iter()
            .all(|(name, value)| record.attr(name) == Some(value))
    }
}

// ============================================================================
// SearchOptions
// ============================================================================

/// Default number of partitions probed on approximate indexes.
pub const DEFAULT_NPROBE: usize = 1;

/// Options for a single search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Number of neighbors to return; clamped to the index population.
    pub k: usize,

    /// Partitions to probe on approximate indexes (advisory for flat).
    pub nprobe: usize,

    /// Optional attribute filter.
    pub filter: Option<SearchFilter>,
}

impl SearchOptions {
    /// Create options returning `k` neighbors with defaults otherwise.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            nprobe: DEFAULT_NPROBE,
            filter: None,
        }
    }

    /// Set the probe count.
    pub fn with_nprobe(mut self, nprobe: usize) -> Self {
        self.nprobe = nprobe;
        self
    }

    /// Set the attribute filter.
    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

// ============================================================================
// QueryEngine
// ============================================================================

/// Executes KNN searches against immutable indexes.
///
/// Holds a handle to the catalog for filter evaluation; otherwise stateless.
/// Safe for many concurrent callers.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    catalog: Arc<Catalog>,
}

impl QueryEngine {
    /// Create a query engine reading filters from the given catalog.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Search `index` for the `opts.k` nearest neighbors of `query`.
    ///
    /// # Errors
    ///
    /// - [`VssError::InvalidArgument`] when `opts.k == 0`.
    /// - [`VssError::DimensionMismatch`] when the query length differs from
    ///   the index dimension (non-empty indexes only).
    /// - [`VssError::DegenerateVector`] for zero-norm inputs under cosine.
    pub fn search(
        &self,
        index: &Index,
        query: &[f32],
        opts: &SearchOptions,
    ) -> Result<Vec<Neighbor>, VssError> {
        if opts.k == 0 {
            return Err(VssError::invalid_argument("k must be positive"));
        }

        // An empty index answers every query with zero results.
        if index.is_empty() {
            return Ok(Vec::new());
        }

        if query.len() != index.dim() {
            return Err(VssError::DimensionMismatch {
                expected: index.dim(),
                actual: query.len(),
            });
        }

        let metric = index.metric();
        if metric == Metric::Cosine && norm(query) == 0.0 {
            return Err(VssError::degenerate_query());
        }

        // Filters resolve to an id set in one catalog pass, before ranking.
        let allowed = match &opts.filter {
            Some(filter) if !filter.is_empty() => Some(self.catalog.matching_ids(filter)?),
            _ => None,
        };

        let candidates = index.candidate_rows(query, opts.nprobe.max(1));
        trace!(
            "Searching {} candidates (k={}, nprobe={})",
            candidates.len(),
            opts.k,
            opts.nprobe
        );

        // Bounded max-heap of the K best (distance, id) pairs seen so far.
        let mut heap: BinaryHeap<Candidate> =
            BinaryHeap::with_capacity(opts.k.min(candidates.len()) + 1);
        for row in candidates {
            let id = index.record_id(row);
            if let Some(allowed) = &allowed {
                if !allowed.contains(id) {
                    continue;
                }
            }

            let distance = metric
                .distance(query, index.vector(row))
                .ok_or_else(|| VssError::degenerate_record(id.as_str()))?;

            let candidate = Candidate {
                distance,
                id: id.clone(),
            };
            if heap.len() < opts.k {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if candidate.cmp(worst) == Ordering::Less {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        let results = heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor::new(c.id, c.distance))
            .collect();
        Ok(results)
    }
}

// ============================================================================
// Candidate ordering
// ============================================================================

/// Heap entry ordered by (distance, id); the max-heap keeps the worst
/// candidate on top so it can be evicted in O(log K).
#[derive(Debug, Clone)]
struct Candidate {
    distance: f32,
    id: RecordId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexAlgorithm, IndexBuilder, IndexParams};
    use crate::store::StoreSnapshot;

    fn build_index(entries: Vec<(&str, Vec<f32>)>, metric: Metric) -> Index {
        let snapshot = StoreSnapshot::from_entries(
            entries
                .into_iter()
                .map(|(id, v)| (RecordId::new(id), v)),
        );
        IndexBuilder::build(&snapshot, metric, IndexAlgorithm::Flat, &IndexParams::default())
            .unwrap()
    }

    fn engine() -> QueryEngine {
        QueryEngine::new(Arc::new(Catalog::new()))
    }

    fn abc_index() -> Index {
        build_index(
            vec![
                ("a", vec![0.0, 0.0]),
                ("b", vec![1.0, 0.0]),
                ("c", vec![3.0, 4.0]),
            ],
            Metric::L2,
        )
    }

    #[test]
    fn test_l2_concrete_scenario() {
        let results = engine()
            .search(&abc_index(), &[0.0, 0.0], &SearchOptions::new(2))
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Neighbor::new("a", 0.0));
        assert_eq!(results[1], Neighbor::new("b", 1.0));
    }

    #[test]
    fn test_k_clamps_to_population() {
        let results = engine()
            .search(&abc_index(), &[0.0, 0.0], &SearchOptions::new(10))
            .unwrap();
        // 3 vectors, not 10, and no error.
        assert_eq!(results.len(), 3);
        assert_eq!(results[2], Neighbor::new("c", 25.0));
    }

    #[test]
    fn test_zero_k_is_invalid() {
        let err = engine()
            .search(&abc_index(), &[0.0, 0.0], &SearchOptions::new(0))
            .unwrap_err();
        assert!(matches!(err, VssError::InvalidArgument(_)));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let err = engine()
            .search(&abc_index(), &[0.0, 0.0, 0.0], &SearchOptions::new(1))
            .unwrap_err();
        assert!(matches!(
            err,
            VssError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_reflexivity() {
        let index = abc_index();
        for (id, v) in [("a", [0.0, 0.0]), ("b", [1.0, 0.0]), ("c", [3.0, 4.0])] {
            let results = engine().search(&index, &v, &SearchOptions::new(1)).unwrap();
            assert_eq!(results[0].id.as_str(), id);
            assert_eq!(results[0].distance, 0.0);
        }
    }

    #[test]
    fn test_prefix_monotonicity() {
        let index = abc_index();
        let query = [2.0, 1.0];
        let engine = engine();
        let k3 = engine.search(&index, &query, &SearchOptions::new(3)).unwrap();
        for k in 1..=3 {
            let smaller = engine.search(&index, &query, &SearchOptions::new(k)).unwrap();
            assert_eq!(smaller.as_slice(), &k3[..k]);
        }
    }

    #[test]
    fn test_ties_break_by_id_ascending() {
        // Two identical vectors at distance 0 from the query.
        let index = build_index(
            vec![
                ("z-dup", vec![1.0, 1.0]),
                ("a-dup", vec![1.0, 1.0]),
                ("far", vec![5.0, 5.0]),
            ],
            Metric::L2,
        );
        let results = engine()
            .search(&index, &[1.0, 1.0], &SearchOptions::new(2))
            .unwrap();
        assert_eq!(results[0].id.as_str(), "a-dup");
        assert_eq!(results[1].id.as_str(), "z-dup");
        assert_eq!(results[0].distance, 0.0);
        assert_eq!(results[1].distance, 0.0);
    }

    #[test]
    fn test_empty_index_answers_zero_results() {
        let index = build_index(vec![], Metric::L2);
        // Dimension is not checked against an empty index.
        let results = engine()
            .search(&index, &[1.0, 2.0, 3.0], &SearchOptions::new(5))
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_cosine_degenerate_query() {
        let index = build_index(vec![("a", vec![1.0, 0.0])], Metric::Cosine);
        let err = engine()
            .search(&index, &[0.0, 0.0], &SearchOptions::new(1))
            .unwrap_err();
        assert!(matches!(err, VssError::DegenerateVector { .. }));
    }

    #[test]
    fn test_cosine_degenerate_record() {
        let index = build_index(
            vec![("a", vec![1.0, 0.0]), ("zero", vec![0.0, 0.0])],
            Metric::Cosine,
        );
        let err = engine()
            .search(&index, &[1.0, 1.0], &SearchOptions::new(2))
            .unwrap_err();
        match err {
            VssError::DegenerateVector { subject } => assert!(subject.contains("zero")),
            other => panic!("Expected DegenerateVector, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_excludes_closer_candidates() {
        let catalog = Arc::new(Catalog::new());
        catalog
            .upsert(Record::new("a").with_tag("Category", "Purse"))
            .unwrap();
        catalog
            .upsert(Record::new("b").with_tag("Category", "Shoes"))
            .unwrap();
        let engine = QueryEngine::new(Arc::clone(&catalog));

        // b is geometrically closer to the query than a.
        let index = build_index(
            vec![("a", vec![10.0, 0.0]), ("b", vec![1.0, 0.0])],
            Metric::L2,
        );
        let opts = SearchOptions::new(5)
            .with_filter(SearchFilter::new().with_tag("Category", "Purse"));
        let results = engine.search(&index, &[0.0, 0.0], &opts).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id.as_str(), "a");
    }

    #[test]
    fn test_filter_misses_uncataloged_records() {
        // Vector present in the index but no catalog record: filtered out.
        let catalog = Arc::new(Catalog::new());
        catalog
            .upsert(Record::new("a").with_tag("Category", "Purse"))
            .unwrap();
        let engine = QueryEngine::new(Arc::clone(&catalog));

        let index = build_index(
            vec![("a", vec![1.0, 0.0]), ("ghost", vec![0.0, 0.0])],
            Metric::L2,
        );
        let opts = SearchOptions::new(5)
            .with_filter(SearchFilter::new().with_tag("Category", "Purse"));
        let results = engine.search(&index, &[0.0, 0.0], &opts).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id.as_str(), "a");
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let opts = SearchOptions::new(3).with_filter(SearchFilter::new());
        let results = engine().search(&abc_index(), &[0.0, 0.0], &opts).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_filter_matches_semantics() {
        let record = Record::new("id:1")
            .with_tag("Category", "Purse")
            .with_number("Price", 77.0);

        assert!(SearchFilter::new().matches(&record));
        assert!(SearchFilter::new().with_tag("Category", "Purse").matches(&record));
        assert!(!SearchFilter::new().with_tag("Category", "Shoes").matches(&record));
        // Tag and text do not cross-match.
        assert!(!SearchFilter::new()
            .with_equals("Category", AttrValue::Text("Purse".to_string()))
            .matches(&record));
        // AND semantics.
        assert!(!SearchFilter::new()
            .with_tag("Category", "Purse")
            .with_equals("Price", AttrValue::Number(80.0))
            .matches(&record));
    }
}
