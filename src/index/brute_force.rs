//! Brute force index for exact nearest neighbor search.
//!
//! Serves as the ground truth baseline for the graph index. It computes
//! distances to all vectors and returns the k closest, optionally restricted
//! by a caller-supplied predicate over vector ids.

use crate::distance::DistanceMetric;
use crate::vector::Vector;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A vector with its computed distance, used for heap operations.
#[derive(Clone)]
struct ScoredVector {
    id: u64,
    distance: f32,
}

impl PartialEq for ScoredVector {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for ScoredVector {}

impl PartialOrd for ScoredVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Normal ordering: BinaryHeap is a max-heap, so peek() gives largest distance.
        // This lets us efficiently maintain the k smallest distances by comparing
        // new candidates against our current worst (largest) distance.
        self.distance.partial_cmp(&other.distance)
    }
}

impl Ord for ScoredVector {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Brute force index that performs exact nearest neighbor search.
///
/// Guarantees 100% recall at the cost of O(n) search time, which makes it
/// the reference when measuring the graph index's recall.
pub struct BruteForceIndex {
    vectors: Vec<Vector>,
    metric: DistanceMetric,
}

impl BruteForceIndex {
    /// Create a new empty brute force index with the given distance metric.
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            vectors: Vec::new(),
            metric,
        }
    }

    /// Add a vector to the index.
    pub fn add(&mut self, vector: Vector) {
        self.vectors.push(vector);
    }

    /// Return the number of vectors in the index.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Return true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Search for the k nearest neighbors using a linear scan.
    ///
    /// Returns a vector of (id, distance) pairs sorted by distance.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(u64, f32)> {
        self.search_where(query, k, |_| true)
    }

    /// Linear scan restricted to vectors whose id satisfies `predicate`.
    ///
    /// Used to compute exact range-restricted answers: pass a predicate
    /// that checks the point's attribute against the query range.
    pub fn search_where(
        &self,
        query: &[f32],
        k: usize,
        predicate: impl Fn(u64) -> bool,
    ) -> Vec<(u64, f32)> {
        let mut heap: BinaryHeap<ScoredVector> = BinaryHeap::with_capacity(k);

        for vector in &self.vectors {
            if !predicate(vector.id) {
                continue;
            }
            let distance = self.metric.compute(query, &vector.data);

            if heap.len() < k {
                heap.push(ScoredVector {
                    id: vector.id,
                    distance,
                });
            } else if distance < heap.peek().unwrap().distance {
                heap.pop();
                heap.push(ScoredVector {
                    id: vector.id,
                    distance,
                });
            }
        }

        let mut results: Vec<(u64, f32)> =
            heap.into_iter().map(|sv| (sv.id, sv.distance)).collect();
        results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        results
    }

    /// Parallel search using Rayon for multi-core scaling.
    ///
    /// Divides the vector set into chunks, processes each chunk in parallel,
    /// then merges results.
    pub fn search_parallel(&self, query: &[f32], k: usize) -> Vec<(u64, f32)> {
        const CHUNK_SIZE: usize = 1000;

        let final_heap = self
            .vectors
            .par_chunks(CHUNK_SIZE)
            .map(|chunk| {
                let mut local_heap: BinaryHeap<ScoredVector> = BinaryHeap::with_capacity(k);

                for vector in chunk {
                    let distance = self.metric.compute(query, &vector.data);

                    if local_heap.len() < k {
                        local_heap.push(ScoredVector {
                            id: vector.id,
                            distance,
                        });
                    } else if distance < local_heap.peek().unwrap().distance {
                        local_heap.pop();
                        local_heap.push(ScoredVector {
                            id: vector.id,
                            distance,
                        });
                    }
                }

                local_heap
            })
            .reduce(
                || BinaryHeap::with_capacity(k),
                |mut a, b| {
                    for item in b {
                        if a.len() < k {
                            a.push(item);
                        } else if item.distance < a.peek().unwrap().distance {
                            a.pop();
                            a.push(item);
                        }
                    }
                    a
                },
            );

        let mut results: Vec<(u64, f32)> = final_heap
            .into_iter()
            .map(|sv| (sv.id, sv.distance))
            .collect();
        results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        results
    }
}
