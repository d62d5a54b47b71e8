//! Flat (exact) index: contiguous vector storage with an id side-table.

use super::SearchStructure;
use crate::types::RecordId;

// ============================================================================
// FlatStorage
// ============================================================================

/// Row storage shared by the flat and IVF structures: vectors packed
/// contiguously, ids in a parallel side-table, both in id order.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlatStorage {
    dim: usize,
    ids: Vec<RecordId>,
    data: Vec<f32>,
}

impl FlatStorage {
    /// Build storage from id-ordered entries of uniform dimension.
    ///
    /// Callers (the index builder) have already validated uniformity.
    pub(crate) fn from_sorted(dim: usize, entries: impl Iterator<Item = (RecordId, Vec<f32>)>) -> Self {
        let mut ids = Vec::new();
        let mut data = Vec::new();
        for (id, vector) in entries {
            ids.push(id);
            data.extend_from_slice(&vector);
        }
        Self { dim, ids, data }
    }

    pub(crate) fn dim(&self) -> usize {
        self.dim
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn record_id(&self, row: u32) -> &RecordId {
        &self.ids[row as usize]
    }

    pub(crate) fn vector(&self, row: u32) -> &[f32] {
        let start = row as usize * self.dim;
        &self.data[start..start + self.dim]
    }

    /// Iterate all rows as `(row, vector)` pairs.
    pub(crate) fn rows(&self) -> impl Iterator<Item = (u32, &[f32])> {
        self.data
            .chunks_exact(self.dim.max(1))
            .enumerate()
            .map(|(i, v)| (i as u32, v))
    }
}

// ============================================================================
// FlatIndex
// ============================================================================

/// Exact search structure: every row is a candidate for every query.
///
/// O(1) build beyond the copy; O(N) scan at query time.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    storage: FlatStorage,
}

impl FlatIndex {
    pub(crate) fn new(storage: FlatStorage) -> Self {
        Self { storage }
    }
}

impl SearchStructure for FlatIndex {
    fn len(&self) -> usize {
        self.storage.len()
    }

    fn record_id(&self, row: u32) -> &RecordId {
        self.storage.record_id(row)
    }

    fn vector(&self, row: u32) -> &[f32] {
        self.storage.vector(row)
    }

    fn candidate_rows(&self, _query: &[f32], _nprobe: usize) -> Vec<u32> {
        (0..self.storage.len() as u32).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
