//! Catalog of record attributes.
//!
//! The catalog owns [`Record`]s; the vector store and indexes reference them
//! by id only. The query engine reads the catalog to evaluate attribute
//! filters before distance ranking.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tracing::trace;

use crate::errors::VssError;
use crate::query::SearchFilter;
use crate::types::{Record, RecordId};

/// Thread-safe store of record attributes, keyed by record id.
///
/// Many concurrent readers; the catalog is the sole writer of its map.
#[derive(Debug, Default)]
pub struct Catalog {
    records: RwLock<HashMap<RecordId, Record>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record (last-write-wins).
    pub fn upsert(&self, record: Record) -> Result<(), VssError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| VssError::internal(format!("catalog lock poisoned: {}", e)))?;
        trace!("Catalog upsert: {}", record.id);
        records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Get a record by id, if present.
    pub fn get(&self, id: &RecordId) -> Result<Option<Record>, VssError> {
        let records = self
            .records
            .read()
            .map_err(|e| VssError::internal(format!("catalog lock poisoned: {}", e)))?;
        Ok(records.get(id).cloned())
    }

    /// Remove a record. Tolerant no-op when absent; returns whether a record
    /// was actually removed.
    pub fn delete(&self, id: &RecordId) -> Result<bool, VssError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| VssError::internal(format!("catalog lock poisoned: {}", e)))?;
        Ok(records.remove(id).is_some())
    }

    /// Number of records in the catalog.
    pub fn len(&self) -> Result<usize, VssError> {
        let records = self
            .records
            .read()
            .map_err(|e| VssError::internal(format!("catalog lock poisoned: {}", e)))?;
        Ok(records.len())
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> Result<bool, VssError> {
        Ok(self.len()? == 0)
    }

    /// Collect the ids of all records matching a filter.
    ///
    /// One pass under a single read lock; used by the query engine to apply
    /// filters before ranking. Records absent from the catalog never match.
    pub fn matching_ids(&self, filter: &SearchFilter) -> Result<HashSet<RecordId>, VssError> {
        let records = self
            .records
            .read()
            .map_err(|e| VssError::internal(format!("catalog lock poisoned: {}", e)))?;
        Ok(records
            .values()
            .filter(|r| filter.matches(r))
            .map(|r| r.id.clone())
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
