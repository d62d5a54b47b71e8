//! Pure snapshot → index construction.

use tracing::debug;

use super::flat::{FlatIndex, FlatStorage};
use super::ivf::IvfFlatIndex;
use super::{Index, IndexAlgorithm, IndexParams};
use crate::errors::VssError;
use crate::metric::Metric;
use crate::store::StoreSnapshot;

/// Builds immutable [`Index`] values from store snapshots.
///
/// Build is a pure function of its inputs: the snapshot is never mutated,
/// and a failed build leaves nothing behind. An empty snapshot builds an
/// empty index that answers every query with zero results.
#[derive(Debug, Default)]
pub struct IndexBuilder;

impl IndexBuilder {
    /// Build an index over `snapshot` with the given metric and algorithm.
    ///
    /// # Errors
    ///
    /// [`VssError::InconsistentDimension`] when the snapshot holds vectors
    /// of mixed lengths, naming the smallest-id offender.
    pub fn build(
        snapshot: &StoreSnapshot,
        metric: Metric,
        algorithm: IndexAlgorithm,
        params: &IndexParams,
    ) -> Result<Index, VssError> {
        if snapshot.is_empty() {
            debug!("Building empty {} index", algorithm);
            return Ok(Index::new(
                0,
                metric,
                algorithm,
                Box::new(FlatIndex::default()),
            ));
        }

        let dim = Self::validate_dimensions(snapshot)?;
        debug!(
            "Building {} index: {} vectors, dim {}, metric {}",
            algorithm,
            snapshot.len(),
            dim,
            metric
        );

        let storage = FlatStorage::from_sorted(
            dim,
            snapshot.iter().map(|(id, v)| (id.clone(), v.to_vec())),
        );

        let structure: Box<dyn super::SearchStructure> = match algorithm {
            IndexAlgorithm::Flat => Box::new(FlatIndex::new(storage)),
            IndexAlgorithm::IvfFlat => Box::new(IvfFlatIndex::build(
                storage,
                params.partitions,
                params.kmeans_iterations,
            )),
        };

        Ok(Index::new(dim, metric, algorithm, structure))
    }

    /// Check that every vector in the snapshot shares one dimension.
    ///
    /// The expected dimension is the first entry's in id order; the first
    /// entry that disagrees is named in the error.
    fn validate_dimensions(snapshot: &StoreSnapshot) -> Result<usize, VssError> {
        let mut entries = snapshot.iter();
        let (first_id, first) = entries
            .next()
            .ok_or_else(|| VssError::internal("validate_dimensions on empty snapshot"))?;

        let expected = first.len();
        if expected == 0 {
            return Err(VssError::invalid_argument(format!(
                "record `{}` has an empty vector",
                first_id
            )));
        }

        for (id, vector) in entries {
            if vector.len() != expected {
                return Err(VssError::InconsistentDimension {
                    id: id.to_string(),
                    expected,
                    actual: vector.len(),
                });
            }
        }
        Ok(expected)
    }
}

// ============================================================================
// Tests
// ============================================================================
