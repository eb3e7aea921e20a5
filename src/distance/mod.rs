//! Distance computation module providing both scalar and SIMD implementations.
//!
//! The public API automatically selects the fastest available implementation
//! based on CPU feature detection at runtime.

pub mod scalar;
pub mod simd;

// Re-export the auto-dispatching functions as the primary API
pub use simd::{dot_product, euclidean_distance, euclidean_distance_squared};

use serde::{Deserialize, Serialize};

/// Supported distance metrics for similarity search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean (L2) distance: sqrt(sum((a[i] - b[i])^2))
    Euclidean,
    /// Squared Euclidean distance: sum((a[i] - b[i])^2)
    /// Faster than Euclidean when only relative ordering matters.
    EuclideanSquared,
    /// Cosine distance: 1 - cosine_similarity(a, b)
    /// Range [0, 2] where 0 means identical direction.
    Cosine,
    /// Negative dot product: -dot(a, b)
    /// Negated for min-heap compatibility (larger dot = smaller distance).
    DotProduct,
}

impl DistanceMetric {
    /// Compute the distance between two vectors using this metric.
    ///
    /// # Panics
    /// Panics if the vectors have different dimensions.
    #[inline]
    pub fn compute(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Euclidean => euclidean_distance(a, b),
            DistanceMetric::EuclideanSquared => euclidean_distance_squared(a, b),
            DistanceMetric::Cosine => scalar::cosine_distance(a, b),
            DistanceMetric::DotProduct => -dot_product(a, b), // Negative for min-heap
        }
    }
}
