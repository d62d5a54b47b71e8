//! IVF-Flat (partitioned) index: k-means buckets with flat storage.
//!
//! Vectors are partitioned into buckets by nearest centroid; at search time
//! only the `nprobe` closest buckets are scanned. Centroid training is
//! deterministic: initial centroids are evenly spaced over the id-ordered
//! rows and refined by a fixed number of Lloyd iterations, so two builds
//! over the same snapshot produce identical indexes.

use rayon::prelude::*;

use super::flat::FlatStorage;
use super::SearchStructure;
use crate::metric::l2_squared;
use crate::types::RecordId;

// ============================================================================
// IvfFlatIndex
// ============================================================================

/// Approximate search structure: probe the nearest buckets only.
///
/// Partitioning always uses squared L2 over the raw vectors, independent of
/// the index's query metric; this is part of the recall trade-off.
#[derive(Debug, Clone)]
pub struct IvfFlatIndex {
    storage: FlatStorage,
    /// Centroid vectors, one per bucket. `centroids[i].len() == dim`.
    centroids: Vec<Vec<f32>>,
    /// Row indexes per bucket; every row appears in exactly one bucket.
    buckets: Vec<Vec<u32>>,
}

impl IvfFlatIndex {
    /// Partition the given storage into at most `partitions` buckets.
    pub(crate) fn build(storage: FlatStorage, partitions: usize, iterations: usize) -> Self {
        let n = storage.len();
        let k = partitions.clamp(1, n.max(1));

        let (centroids, assignments) = train_centroids(&storage, k, iterations);

        let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); centroids.len()];
        for (row, &cluster) in assignments.iter().enumerate() {
            buckets[cluster].push(row as u32);
        }

        Self {
            storage,
            centroids,
            buckets,
        }
    }

    /// Number of buckets in this index.
    pub fn num_partitions(&self) -> usize {
        self.centroids.len()
    }
}

impl SearchStructure for IvfFlatIndex {
    fn len(&self) -> usize {
        self.storage.len()
    }

    fn record_id(&self, row: u32) -> &RecordId {
        self.storage.record_id(row)
    }

    fn vector(&self, row: u32) -> &[f32] {
        self.storage.vector(row)
    }

    fn candidate_rows(&self, query: &[f32], nprobe: usize) -> Vec<u32> {
        if self.centroids.is_empty() {
            return Vec::new();
        }

        // Rank buckets by centroid distance; ties resolve to the lowest index.
        let mut ranked: Vec<(f32, usize)> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (l2_squared(query, c), i))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let probes = nprobe.clamp(1, self.centroids.len());
        ranked
            .iter()
            .take(probes)
            .flat_map(|&(_, i)| self.buckets[i].iter().copied())
            .collect()
    }
}

// ============================================================================
// Centroid training
// ============================================================================

/// Train `k` centroids over the storage with `iterations` Lloyd passes.
///
/// Returns the centroids and the final per-row assignment. Initial centroids
/// are the rows at evenly spaced indexes `i * n / k`; a cluster left empty
/// during an iteration keeps its previous centroid.
fn train_centroids(storage: &FlatStorage, k: usize, iterations: usize) -> (Vec<Vec<f32>>, Vec<usize>) {
    let n = storage.len();
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    let dim = storage.dim();
    let mut centroids: Vec<Vec<f32>> = (0..k)
        .map(|i| storage.vector((i * n / k) as u32).to_vec())
        .collect();

    let mut assignments = assign_rows(storage, &centroids);
    for _ in 0..iterations {
        // Recompute each centroid as the mean of its assigned rows.
        let mut sums: Vec<Vec<f64>> = vec![vec![0.0; dim]; k];
        let mut counts: Vec<usize> = vec![0; k];
        for (row, &cluster) in assignments.iter().enumerate() {
            counts[cluster] += 1;
            for (acc, x) in sums[cluster].iter_mut().zip(storage.vector(row as u32)) {
                *acc += f64::from(*x);
            }
        }
        for (cluster, count) in counts.iter().enumerate() {
            if *count > 0 {
                for (c, acc) in centroids[cluster].iter_mut().zip(&sums[cluster]) {
                    *c = (*acc / *count as f64) as f32;
                }
            }
        }

        assignments = assign_rows(storage, &centroids);
    }

    (centroids, assignments)
}

/// Assign every row to its nearest centroid (ties to the lowest index).
fn assign_rows(storage: &FlatStorage, centroids: &[Vec<f32>]) -> Vec<usize> {
    let rows: Vec<(u32, &[f32])> = storage.rows().collect();
    rows.par_iter()
        .map(|(_, vector)| nearest_centroid(vector, centroids))
        .collect()
}

fn nearest_centroid(vector: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let dist = l2_squared(vector, centroid);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

// ============================================================================
// Tests
// ============================================================================
