//! Registry and lifecycle of named indexes.
//!
//! The manager owns the only mapping from name to published [`Index`] and is
//! its sole writer. Rebuilds construct the new index entirely outside the
//! lock, then swap it in; readers in flight keep their `Arc` to the old
//! index until they finish, so a query never observes a half-built index and
//! a replaced name never transiently disappears.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::errors::VssError;
use crate::index::{Index, IndexAlgorithm, IndexBuilder, IndexInfo, IndexParams};
use crate::metric::Metric;
use crate::store::StoreSnapshot;

/// Thread-safe registry of named, immutable indexes.
#[derive(Debug, Default)]
pub struct IndexManager {
    indexes: RwLock<HashMap<String, Arc<Index>>>,
}

impl IndexManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over `snapshot` and publish it under `name`,
    /// atomically replacing any prior index with that name.
    ///
    /// Concurrent calls for the same name race; the last one to publish
    /// wins. Calls for different names are independent.
    ///
    /// # Errors
    ///
    /// - [`VssError::InvalidArgument`] for an empty name.
    /// - Build failures ([`VssError::InconsistentDimension`]) leave any
    ///   previously published index untouched.
    pub fn create_or_replace(
        &self,
        name: &str,
        snapshot: &StoreSnapshot,
        metric: Metric,
        algorithm: IndexAlgorithm,
        params: &IndexParams,
    ) -> Result<IndexInfo, VssError> {
        if name.is_empty() {
            return Err(VssError::invalid_argument("index name must not be empty"));
        }

        // Build outside the lock; the registry stays readable throughout.
        let index = Arc::new(IndexBuilder::build(snapshot, metric, algorithm, params)?);
        let info = index.info(name);

        let mut indexes = self
            .indexes
            .write()
            .map_err(|e| VssError::internal(format!("index registry lock poisoned: {}", e)))?;
        let replaced = indexes.insert(name.to_string(), index).is_some();
        debug!(
            "Published index `{}` ({} vectors, {}, {}){}",
            name,
            info.count,
            info.metric,
            info.algorithm,
            if replaced { " [replaced]" } else { "" }
        );
        Ok(info)
    }

    /// Drop a named index. Tolerant no-op when absent; returns whether an
    /// index was actually removed.
    ///
    /// Readers holding the dropped index's `Arc` complete normally.
    pub fn drop_index(&self, name: &str) -> Result<bool, VssError> {
        let mut indexes = self
            .indexes
            .write()
            .map_err(|e| VssError::internal(format!("index registry lock poisoned: {}", e)))?;
        let dropped = indexes.remove(name).is_some();
        if dropped {
            debug!("Dropped index `{}`", name);
        }
        Ok(dropped)
    }

    /// Get the currently published index for `name`.
    ///
    /// # Errors
    ///
    /// [`VssError::IndexNotFound`] when the name is unregistered.
    pub fn get(&self, name: &str) -> Result<Arc<Index>, VssError> {
        let indexes = self
            .indexes
            .read()
            .map_err(|e| VssError::internal(format!("index registry lock poisoned: {}", e)))?;
        indexes
            .get(name)
            .cloned()
            .ok_or_else(|| VssError::IndexNotFound(name.to_string()))
    }

    /// Check whether an index is published under `name`.
    pub fn contains(&self, name: &str) -> Result<bool, VssError> {
        let indexes = self
            .indexes
            .read()
            .map_err(|e| VssError::internal(format!("index registry lock poisoned: {}", e)))?;
        Ok(indexes.contains_key(name))
    }

    /// Summaries of all published indexes, sorted by name.
    pub fn list(&self) -> Result<Vec<IndexInfo>, VssError> {
        let indexes = self
            .indexes
            .read()
            .map_err(|e| VssError::internal(format!("index registry lock poisoned: {}", e)))?;
        let mut infos: Vec<IndexInfo> = indexes
            .iter()
            .map(|(name, index)| index.info(name))
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordId;

    fn snapshot(entries: Vec<(&str, Vec<f32>)>) -> StoreSnapshot {
        StoreSnapshot::from_entries(entries.into_iter().map(|(id, v)| (RecordId::new(id), v)))
    }

    fn abc() -> StoreSnapshot {
        snapshot(vec![
            ("a", vec![0.0, 0.0]),
            ("b", vec![1.0, 0.0]),
            ("c", vec![3.0, 4.0]),
        ])
    }

    #[test]
    fn test_create_and_get() {
        let manager = IndexManager::new();
        let info = manager
            .create_or_replace(
                "products",
                &abc(),
                Metric::L2,
                IndexAlgorithm::Flat,
                &IndexParams::default(),
            )
            .unwrap();

        assert_eq!(info.name, "products");
        assert_eq!(info.count, 3);

        let index = manager.get("products").unwrap();
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_get_missing_fails() {
        let manager = IndexManager::new();
        let err = manager.get("missing").unwrap_err();
        assert!(matches!(err, VssError::IndexNotFound(_)));
    }

    #[test]
    fn test_drop_missing_is_noop() {
        let manager = IndexManager::new();
        assert!(!manager.drop_index("missing").unwrap());
    }

    #[test]
    fn test_drop_existing() {
        let manager = IndexManager::new();
        manager
            .create_or_replace(
                "products",
                &abc(),
                Metric::L2,
                IndexAlgorithm::Flat,
                &IndexParams::default(),
            )
            .unwrap();

        assert!(manager.drop_index("products").unwrap());
        assert!(!manager.contains("products").unwrap());
    }

    #[test]
    fn test_replace_swaps_atomically_for_held_readers() {
        let manager = IndexManager::new();
        manager
            .create_or_replace(
                "products",
                &abc(),
                Metric::L2,
                IndexAlgorithm::Flat,
                &IndexParams::default(),
            )
            .unwrap();

        // A reader in flight holds the old index.
        let held = manager.get("products").unwrap();

        manager
            .create_or_replace(
                "products",
                &snapshot(vec![("x", vec![7.0, 7.0])]),
                Metric::L2,
                IndexAlgorithm::Flat,
                &IndexParams::default(),
            )
            .unwrap();

        // The held Arc still answers from the old index...
        assert_eq!(held.len(), 3);
        assert_eq!(held.record_id(0).as_str(), "a");
        // ...while new lookups see the replacement.
        assert_eq!(manager.get("products").unwrap().len(), 1);
    }

    #[test]
    fn test_failed_build_leaves_published_index_untouched() {
        let manager = IndexManager::new();
        manager
            .create_or_replace(
                "products",
                &abc(),
                Metric::L2,
                IndexAlgorithm::Flat,
                &IndexParams::default(),
            )
            .unwrap();

        let mixed = snapshot(vec![("a", vec![0.0, 0.0]), ("b", vec![1.0])]);
        let err = manager
            .create_or_replace(
                "products",
                &mixed,
                Metric::L2,
                IndexAlgorithm::Flat,
                &IndexParams::default(),
            )
            .unwrap_err();
        assert!(matches!(err, VssError::InconsistentDimension { .. }));

        // The previously published index is still there, unchanged.
        assert_eq!(manager.get("products").unwrap().len(), 3);
    }

    #[test]
    fn test_empty_name_rejected() {
        let manager = IndexManager::new();
        let err = manager
            .create_or_replace(
                "",
                &abc(),
                Metric::L2,
                IndexAlgorithm::Flat,
                &IndexParams::default(),
            )
            .unwrap_err();
        assert!(matches!(err, VssError::InvalidArgument(_)));
    }

    #[test]
    fn test_list_sorted_by_name() {
        let manager = IndexManager::new();
        for name in ["zeta", "alpha"] {
            manager
                .create_or_replace(
                    name,
                    &abc(),
                    Metric::L2,
                    IndexAlgorithm::Flat,
                    &IndexParams::default(),
                )
                .unwrap();
        }

        let names: Vec<String> = manager.list().unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
