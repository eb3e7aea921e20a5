//! Bounded-degree proximity graph owned by a single range-tree node.
//!
//! Edges only ever connect points inside the owning node's half-open range,
//! so any point reached by traversal automatically satisfies a query range
//! that fully contains the node. Search still applies a cheap range check on
//! admitted neighbors as a guard against a corrupted adjacency list.

use crate::constants::index::INLINE_NEIGHBORS;
use crate::distance::DistanceMetric;
use crate::vector::VectorStore;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Neighbor list for one point. Inline capacity covers typical M values.
pub type NeighborList = SmallVec<[u32; INLINE_NEIGHBORS]>;

/// A point with its computed distance, used for heap operations and result
/// merging. Ordered ascending by distance.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    pub distance: f32,
    pub id: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.distance.partial_cmp(&other.distance)
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Adjacency lists and entry point for the points in `[lo, hi)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeGraph {
    lo: u32,
    hi: u32,
    entry: u32,
    neighbors: Vec<NeighborList>,
}

impl NodeGraph {
    /// Create an edge-less graph over the positions `[lo, hi)`.
    pub fn new(lo: u32, hi: u32) -> Self {
        Self {
            lo,
            hi,
            entry: lo,
            neighbors: vec![NeighborList::new(); (hi - lo) as usize],
        }
    }

    /// The half-open sorted-position range this graph covers.
    #[inline]
    pub fn range(&self) -> (u32, u32) {
        (self.lo, self.hi)
    }

    /// The sorted id search is seeded from: the node's first-inserted point.
    #[inline]
    pub fn entry_point(&self) -> u32 {
        self.entry
    }

    pub(crate) fn set_entry_point(&mut self, id: u32) {
        debug_assert!(self.contains(id));
        self.entry = id;
    }

    /// True if the sorted id lies inside this graph's range.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        (self.lo..self.hi).contains(&id)
    }

    /// Neighbor ids of the given point.
    #[inline]
    pub fn neighbors(&self, id: u32) -> &[u32] {
        &self.neighbors[(id - self.lo) as usize]
    }

    #[inline]
    pub(crate) fn neighbors_mut(&mut self, id: u32) -> &mut NeighborList {
        &mut self.neighbors[(id - self.lo) as usize]
    }

    /// Add the edge `a -> b` unless it already exists.
    pub(crate) fn link(&mut self, a: u32, b: u32) {
        let list = self.neighbors_mut(a);
        if !list.contains(&b) {
            list.push(b);
        }
    }

    /// The largest neighbor-list length in this graph.
    pub fn max_degree(&self) -> usize {
        self.neighbors.iter().map(|l| l.len()).max().unwrap_or(0)
    }

    /// Total directed edge count.
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(|l| l.len()).sum()
    }

    /// Greedy beam search from the entry point toward `query`.
    ///
    /// Maintains a min-ordered frontier of unexplored candidates and a
    /// bounded max-heap of the best `ef` results. Expansion stops once the
    /// closest unexplored candidate is farther than the current worst
    /// retained result and the result set is full, or the frontier is
    /// exhausted. Returns candidates sorted ascending by distance.
    pub fn beam_search(
        &self,
        store: &VectorStore,
        metric: DistanceMetric,
        query: &[f32],
        ef: usize,
    ) -> Vec<Candidate> {
        if self.neighbors.is_empty() || ef == 0 {
            return Vec::new();
        }

        let mut visited = vec![false; self.neighbors.len()];
        let mut frontier: BinaryHeap<Reverse<Candidate>> = BinaryHeap::with_capacity(ef);
        let mut results: BinaryHeap<Candidate> = BinaryHeap::with_capacity(ef + 1);

        let entry = self.entry;
        visited[(entry - self.lo) as usize] = true;
        let entry_dist = metric.compute(query, store.get(entry));
        frontier.push(Reverse(Candidate {
            distance: entry_dist,
            id: entry,
        }));
        results.push(Candidate {
            distance: entry_dist,
            id: entry,
        });

        while let Some(Reverse(current)) = frontier.pop() {
            let worst = results.peek().map(|c| c.distance).unwrap_or(f32::MAX);
            if current.distance > worst && results.len() >= ef {
                break;
            }

            for &neighbor in self.neighbors(current.id) {
                // Defensive: edges must never leave the owning range.
                if !self.contains(neighbor) {
                    debug_assert!(false, "edge escapes node range");
                    continue;
                }
                let slot = (neighbor - self.lo) as usize;
                if visited[slot] {
                    continue;
                }
                visited[slot] = true;

                let dist = metric.compute(query, store.get(neighbor));
                let worst = results.peek().map(|c| c.distance).unwrap_or(f32::MAX);
                if dist < worst || results.len() < ef {
                    frontier.push(Reverse(Candidate {
                        distance: dist,
                        id: neighbor,
                    }));
                    results.push(Candidate {
                        distance: dist,
                        id: neighbor,
                    });
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        results.into_sorted_vec()
    }
}
