//! Attribute-sort preprocessing.
//!
//! Rewrites a dataset into attribute-sorted order, producing the dense
//! sorted-position space the range tree partitions, and the bijective
//! sorted-position → original-id mapping persisted with the index.

use crate::error::{RangeForgeError, Result};
use crate::vector::{Vector, VectorStore};

/// A dataset reordered by attribute value.
///
/// `store` holds vectors addressed by sorted position, `attributes` is the
/// non-decreasing attribute sequence, and `sorted_to_original[i]` is the
/// original id of the point now at sorted position `i`.
#[derive(Debug)]
pub struct SortedDataset {
    pub store: VectorStore,
    pub attributes: Vec<i64>,
    pub sorted_to_original: Vec<u64>,
}

/// Sort points by attribute, ties broken by original id for determinism.
///
/// Fails with `CountMismatch` when the vector and attribute counts differ
/// and with `DimensionMismatch` when the vectors do not share one dimension.
/// An empty input produces an empty `SortedDataset`.
pub fn sort_by_attribute(vectors: &[Vector], attributes: &[i64]) -> Result<SortedDataset> {
    if vectors.len() != attributes.len() {
        return Err(RangeForgeError::count_mismatch(
            "attributes",
            vectors.len(),
            attributes.len(),
        ));
    }

    let dim = vectors.first().map_or(0, |v| v.dim());
    for v in vectors {
        if v.dim() != dim {
            return Err(RangeForgeError::dimension_mismatch(dim, v.dim()));
        }
    }

    let mut order: Vec<usize> = (0..vectors.len()).collect();
    order.sort_by_key(|&i| (attributes[i], vectors[i].id));

    let mut store = VectorStore::with_capacity(dim, vectors.len());
    let mut sorted_attributes = Vec::with_capacity(vectors.len());
    let mut sorted_to_original = Vec::with_capacity(vectors.len());

    for &i in &order {
        store.push(&vectors[i].data)?;
        sorted_attributes.push(attributes[i]);
        sorted_to_original.push(vectors[i].id);
    }

    Ok(SortedDataset {
        store,
        attributes: sorted_attributes,
        sorted_to_original,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: u64, x: f32) -> Vector {
        Vector::new(id, vec![x, x])
    }

    #[test]
    fn test_sorts_by_attribute() {
        let vectors = vec![point(0, 0.0), point(1, 1.0), point(2, 2.0)];
        let attributes = vec![30, 10, 20];

        let sorted = sort_by_attribute(&vectors, &attributes).unwrap();
        assert_eq!(sorted.attributes, vec![10, 20, 30]);
        assert_eq!(sorted.sorted_to_original, vec![1, 2, 0]);
        assert_eq!(sorted.store.get(0), &[1.0, 1.0]);
        assert_eq!(sorted.store.get(2), &[0.0, 0.0]);
    }

    #[test]
    fn test_ties_broken_by_original_id() {
        let vectors = vec![point(2, 2.0), point(0, 0.0), point(1, 1.0)];
        let attributes = vec![5, 5, 5];

        let sorted = sort_by_attribute(&vectors, &attributes).unwrap();
        assert_eq!(sorted.sorted_to_original, vec![0, 1, 2]);
    }

    #[test]
    fn test_mapping_is_permutation() {
        let n = 200;
        let vectors: Vec<Vector> = (0..n).map(|i| Vector::random(i as u64, 4)).collect();
        let attributes = crate::dataset::random_attributes(n, 9);

        let sorted = sort_by_attribute(&vectors, &attributes).unwrap();
        let mut seen = vec![false; n];
        for &id in &sorted.sorted_to_original {
            assert!(!seen[id as usize]);
            seen[id as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_count_mismatch() {
        let vectors = vec![point(0, 0.0)];
        let err = sort_by_attribute(&vectors, &[1, 2]).unwrap_err();
        assert!(matches!(err, RangeForgeError::CountMismatch { .. }));
    }

    #[test]
    fn test_ragged_dimensions() {
        let vectors = vec![point(0, 0.0), Vector::new(1, vec![1.0, 2.0, 3.0])];
        let err = sort_by_attribute(&vectors, &[1, 2]).unwrap_err();
        assert!(matches!(err, RangeForgeError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_empty_input() {
        let sorted = sort_by_attribute(&[], &[]).unwrap();
        assert!(sorted.store.is_empty());
        assert!(sorted.sorted_to_original.is_empty());
    }
}
