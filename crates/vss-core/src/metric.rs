//! Distance metrics for vector similarity search.
//!
//! Every metric is expressed as a *distance*: ascending means closer. The
//! conventions, kept consistent across the whole engine:
//!
//! - **L2**: squared Euclidean distance. No square root is taken on the hot
//!   path; presentation layers may apply `sqrt` at the formatting boundary.
//! - **Cosine**: `1 − dot(a, b) / (‖a‖·‖b‖)`. Zero-norm inputs are
//!   degenerate and rejected by the query engine.
//! - **Inner product**: `−dot(a, b)`, so larger dot products rank first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Metric
// ============================================================================

/// Distance metric for vector similarity search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Squared Euclidean distance (default).
    #[default]
    L2,

    /// Cosine distance.
    Cosine,

    /// Negated inner product.
    #[serde(rename = "ip")]
    InnerProduct,
}

impl Metric {
    /// Get the metric name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L2 => "l2",
            Self::Cosine => "cosine",
            Self::InnerProduct => "ip",
        }
    }

    /// Compute the distance between two equal-length vectors.
    ///
    /// Returns `None` when the cosine metric meets a zero-norm input; the
    /// caller maps that to a `DegenerateVector` error with the right subject.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Option<f32> {
        match self {
            Self::L2 => Some(l2_squared(a, b)),
            Self::Cosine => {
                let norm_a = norm(a);
                let norm_b = norm(b);
                if norm_a == 0.0 || norm_b == 0.0 {
                    return None;
                }
                Some(1.0 - dot(a, b) / (norm_a * norm_b))
            }
            Self::InnerProduct => Some(-dot(a, b)),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "l2" | "euclidean" => Ok(Self::L2),
            "cosine" => Ok(Self::Cosine),
            "ip" | "dot" | "inner_product" => Ok(Self::InnerProduct),
            other => Err(format!("Unknown metric: {}", other)),
        }
    }
}

// ============================================================================
// Distance primitives
// ============================================================================

/// Squared Euclidean distance between two equal-length vectors.
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean norm of a vector.
pub fn norm(a: &[f32]) -> f32 {
    a.iter().map(|x| x * x).sum::<f32>().sqrt()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_roundtrip() {
        assert_eq!(Metric::from_str("l2").unwrap(), Metric::L2);
        assert_eq!(Metric::from_str("euclidean").unwrap(), Metric::L2);
        assert_eq!(Metric::from_str("cosine").unwrap(), Metric::Cosine);
        assert_eq!(Metric::from_str("dot").unwrap(), Metric::InnerProduct);
        assert!(Metric::from_str("hamming").is_err());
        assert_eq!(Metric::L2.to_string(), "l2");
        assert_eq!(Metric::InnerProduct.to_string(), "ip");
        assert_eq!(Metric::default(), Metric::L2);
    }

    #[test]
    fn test_l2_is_squared() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        // Squared distance: 25, not 5.
        assert!((l2_squared(&a, &b) - 25.0).abs() < 1e-6);
        assert_eq!(Metric::L2.distance(&a, &b), Some(25.0));
    }

    #[test]
    fn test_cosine_distance() {
        let a = [1.0, 0.0];
        let b = [1.0, 0.0];
        let c = [0.0, 1.0];
        let d = [-1.0, 0.0];

        assert!(Metric::Cosine.distance(&a, &b).unwrap().abs() < 1e-6);
        assert!((Metric::Cosine.distance(&a, &c).unwrap() - 1.0).abs() < 1e-6);
        assert!((Metric::Cosine.distance(&a, &d).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_norm_is_degenerate() {
        let zero = [0.0, 0.0];
        let a = [1.0, 0.0];
        assert_eq!(Metric::Cosine.distance(&zero, &a), None);
        assert_eq!(Metric::Cosine.distance(&a, &zero), None);
    }

    #[test]
    fn test_inner_product_ranks_larger_dot_first() {
        let q = [1.0, 2.0];
        let close = [2.0, 3.0];
        let far = [0.1, 0.1];
        let d_close = Metric::InnerProduct.distance(&q, &close).unwrap();
        let d_far = Metric::InnerProduct.distance(&q, &far).unwrap();
        assert!(d_close < d_far);
    }

    #[test]
    fn test_metric_serialization() {
        assert_eq!(serde_json::to_string(&Metric::L2).unwrap(), "\"l2\"");
        assert_eq!(serde_json::to_string(&Metric::InnerProduct).unwrap(), "\"ip\"");
        let parsed: Metric = serde_json::from_str("\"cosine\"").unwrap();
        assert_eq!(parsed, Metric::Cosine);
    }
}
