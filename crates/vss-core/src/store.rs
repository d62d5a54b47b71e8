//! Vector store: raw vectors keyed by record id.
//!
//! The store owns no search logic. Index builds consume a
//! [`StoreSnapshot`], a consistent point-in-time view that later upserts
//! never mutate (vectors are shared as `Arc<[f32]>`; the snapshot clones
//! only the map).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use crate::errors::VssError;
use crate::types::RecordId;

// ============================================================================
// VectorStore
// ============================================================================

#[derive(Debug, Default)]
struct StoreState {
    /// Dimension established by the first inserted vector; cleared when the
    /// store drains to empty.
    dim: Option<usize>,
    vectors: HashMap<RecordId, Arc<[f32]>>,
}

/// Thread-safe mapping from record id to vector.
///
/// Keys are unique; upsert is last-write-wins. Many concurrent readers; the
/// store is the sole writer of its map.
#[derive(Debug, Default)]
pub struct VectorStore {
    inner: RwLock<StoreState>,
}

impl VectorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a vector.
    ///
    /// # Errors
    ///
    /// - [`VssError::InvalidArgument`] for an empty vector.
    /// - [`VssError::DimensionMismatch`] when the store already holds
    ///   vectors of a different length.
    pub fn upsert(&self, id: impl Into<RecordId>, vector: Vec<f32>) -> Result<(), VssError> {
        if vector.is_empty() {
            return Err(VssError::invalid_argument("vector must not be empty"));
        }

        let id = id.into();
        let mut state = self
            .inner
            .write()
            .map_err(|e| VssError::internal(format!("store lock poisoned: {}", e)))?;

        match state.dim {
            Some(dim) if dim != vector.len() => {
                return Err(VssError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
            Some(_) => {}
            None => {
                debug!("Vector store dimension established: {}", vector.len());
                state.dim = Some(vector.len());
            }
        }

        trace!("Store upsert: {} ({} components)", id, vector.len());
        state.vectors.insert(id, vector.into());
        Ok(())
    }

    /// Get a vector by id.
    ///
    /// # Errors
    ///
    /// [`VssError::VectorNotFound`] when the id is absent.
    pub fn get(&self, id: &RecordId) -> Result<Arc<[f32]>, VssError> {
        let state = self
            .inner
            .read()
            .map_err(|e| VssError::internal(format!("store lock poisoned: {}", e)))?;
        state
            .vectors
            .get(id)
            .cloned()
            .ok_or_else(|| VssError::VectorNotFound(id.to_string()))
    }

    /// Remove a vector. Tolerant no-op when absent; returns whether a vector
    /// was actually removed.
    ///
    /// Draining the store to empty clears the established dimension, so the
    /// next upsert may re-establish a different one.
    pub fn delete(&self, id: &RecordId) -> Result<bool, VssError> {
        let mut state = self
            .inner
            .write()
            .map_err(|e| VssError::internal(format!("store lock poisoned: {}", e)))?;
        let removed = state.vectors.remove(id).is_some();
        if state.vectors.is_empty() {
            state.dim = None;
        }
        Ok(removed)
    }

    /// Number of vectors in the store.
    pub fn len(&self) -> Result<usize, VssError> {
        let state = self
            .inner
            .read()
            .map_err(|e| VssError::internal(format!("store lock poisoned: {}", e)))?;
        Ok(state.vectors.len())
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> Result<bool, VssError> {
        Ok(self.len()? == 0)
    }

    /// The established dimension, if any vector has been inserted.
    pub fn dimension(&self) -> Result<Option<usize>, VssError> {
        let state = self
            .inner
            .read()
            .map_err(|e| VssError::internal(format!("store lock poisoned: {}", e)))?;
        Ok(state.dim)
    }

    /// Take a consistent point-in-time snapshot for index building.
    ///
    /// Entries are ordered by record id. Upserts and deletes after the
    /// snapshot never affect it.
    pub fn snapshot(&self) -> Result<StoreSnapshot, VssError> {
        let state = self
            .inner
            .read()
            .map_err(|e| VssError::internal(format!("store lock poisoned: {}", e)))?;

        let mut entries: Vec<(RecordId, Arc<[f32]>)> = state
            .vectors
            .iter()
            .map(|(id, v)| (id.clone(), Arc::clone(v)))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        debug!("Store snapshot: {} vectors", entries.len());
        Ok(StoreSnapshot { entries })
    }
}

// ============================================================================
// StoreSnapshot
// ============================================================================

/// Immutable point-in-time view of a vector store, ordered by record id.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    entries: Vec<(RecordId, Arc<[f32]>)>,
}

impl StoreSnapshot {
    /// Build a snapshot directly from entries.
    ///
    /// For integrators feeding vectors from an external source. Entries are
    /// sorted by id and deduplicated last-write-wins. Dimensions are *not*
    /// validated here; the index builder rejects mixed lengths.
    pub fn from_entries(entries: impl IntoIterator<Item = (RecordId, Vec<f32>)>) -> Self {
        let mut map: HashMap<RecordId, Arc<[f32]>> = HashMap::new();
        for (id, vector) in entries {
            map.insert(id, vector.into());
        }
        let mut entries: Vec<(RecordId, Arc<[f32]>)> = map.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Self { entries }
    }

    /// Number of entries in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &[f32])> {
        self.entries.iter().map(|(id, v)| (id, v.as_ref()))
    }
}

// ============================================================================
// Tests
// ============================================================================
