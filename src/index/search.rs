//! Query execution over a built index: range cover, per-node beam search,
//! and global top-k merging, plus index persistence.

use crate::constants::index as defaults;
use crate::distance::DistanceMetric;
use crate::error::{RangeForgeError, Result};
use crate::index::graph::{Candidate, NodeGraph};
use crate::persistence::{self, IndexType};
use crate::tree::{RangeTree, TreeNode};
use crate::vector::VectorStore;
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;
use std::path::Path;

/// A search result: original-space point id and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// Id of the matched point in the original (pre-sort) id space.
    pub id: u64,
    /// Distance from the query vector.
    pub distance: f32,
}

/// Serialized index structure. Vectors live in their own file and are
/// re-attached at load time.
#[derive(Serialize, Deserialize)]
struct IndexPayload {
    point_count: u32,
    dimension: u32,
    m: u32,
    metric: DistanceMetric,
    tree_nodes: Vec<TreeNode>,
    graphs: Vec<NodeGraph>,
    attributes: Vec<i64>,
    sorted_to_original: Vec<u64>,
}

/// An immutable range-filtered ANN index.
///
/// Built once by [`RangeForgeBuilder`](crate::index::RangeForgeBuilder) or
/// loaded from disk, then queried read-only. Queries are safe to run from
/// multiple threads concurrently.
#[derive(Debug)]
pub struct RangeForgeIndex {
    store: VectorStore,
    tree: RangeTree,
    graphs: Vec<NodeGraph>,
    /// Non-decreasing attribute values by sorted position.
    attributes: Vec<i64>,
    /// Permutation of [0, n): sorted position -> original id.
    sorted_to_original: Vec<u64>,
    m: usize,
    metric: DistanceMetric,
    ef_search: usize,
}

impl RangeForgeIndex {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        store: VectorStore,
        tree: RangeTree,
        graphs: Vec<NodeGraph>,
        attributes: Vec<i64>,
        sorted_to_original: Vec<u64>,
        m: usize,
        metric: DistanceMetric,
    ) -> Self {
        Self {
            store,
            tree,
            graphs,
            attributes,
            sorted_to_original,
            m,
            metric,
            ef_search: defaults::DEFAULT_EF_SEARCH,
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True if the index holds no points.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Vector dimension.
    pub fn dim(&self) -> usize {
        self.store.dim()
    }

    /// Degree bound the graphs were pruned to.
    pub fn m(&self) -> usize {
        self.m
    }

    /// The range tree partitioning the sorted-position space.
    pub fn tree(&self) -> &RangeTree {
        &self.tree
    }

    /// Per-node graphs, parallel to the tree arena.
    pub fn graphs(&self) -> &[NodeGraph] {
        &self.graphs
    }

    /// Sorted attribute values, indexed by sorted position.
    pub fn attributes(&self) -> &[i64] {
        &self.attributes
    }

    /// The persisted sorted-position → original-id mapping.
    pub fn mapping(&self) -> &[u64] {
        &self.sorted_to_original
    }

    /// Set the beam width for search operations.
    pub fn set_ef_search(&mut self, ef_search: usize) {
        self.ef_search = ef_search;
    }

    /// Current search beam width.
    pub fn ef_search(&self) -> usize {
        self.ef_search
    }

    /// Find the k approximate nearest neighbors to `query` among points
    /// whose attribute lies in the inclusive range `[attr_lo, attr_hi]`.
    ///
    /// Results carry original-space ids, sorted ascending by distance.
    /// An inverted range (`attr_lo > attr_hi`) returns an empty result
    /// without error.
    pub fn search(
        &self,
        query: &[f32],
        attr_lo: i64,
        attr_hi: i64,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        if attr_lo > attr_hi {
            self.validate_query(query, k)?;
            return Ok(Vec::new());
        }
        let lo = self.attributes.partition_point(|&a| a < attr_lo);
        let hi = self.attributes.partition_point(|&a| a <= attr_hi);
        self.search_positions(query, lo, hi, k)
    }

    /// Find the k approximate nearest neighbors among points whose sorted
    /// position lies in the half-open range `[lo, hi)`.
    pub fn search_positions(
        &self,
        query: &[f32],
        lo: usize,
        hi: usize,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        self.validate_query(query, k)?;

        let cover = self.tree.cover(lo, hi);
        let ef = self.ef_search.max(k);

        // Global bounded queue of capacity k; the farthest entry is evicted
        // whenever a node's candidates push the size past k. Boundary leaves
        // in the cover may straddle a query endpoint, so each candidate's
        // position is checked against the query range before admission.
        let mut merged: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        for node_index in cover {
            let graph = &self.graphs[node_index];
            let local = graph.beam_search(&self.store, self.metric, query, ef);
            for candidate in local
                .into_iter()
                .filter(|c| (lo..hi).contains(&(c.id as usize)))
                .take(k)
            {
                if merged.len() < k {
                    merged.push(candidate);
                } else if candidate.distance < merged.peek().map_or(f32::MAX, |c| c.distance) {
                    merged.pop();
                    merged.push(candidate);
                }
            }
        }

        Ok(merged
            .into_sorted_vec()
            .into_iter()
            .map(|c| SearchResult {
                id: self.sorted_to_original[c.id as usize],
                distance: c.distance,
            })
            .collect())
    }

    fn validate_query(&self, query: &[f32], k: usize) -> Result<()> {
        if k == 0 {
            return Err(RangeForgeError::invalid_parameter(
                "k must be a positive integer",
            ));
        }
        if !self.is_empty() && query.len() != self.dim() {
            return Err(RangeForgeError::dimension_mismatch(self.dim(), query.len()));
        }
        Ok(())
    }

    /// Persist the tree shape, per-node graphs, attributes, and id mapping.
    /// Vector data is not written; it stays in the dataset file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let payload = IndexPayload {
            point_count: self.store.len() as u32,
            dimension: self.store.dim() as u32,
            m: self.m as u32,
            metric: self.metric,
            tree_nodes: self.tree.nodes().to_vec(),
            graphs: self.graphs.clone(),
            attributes: self.attributes.clone(),
            sorted_to_original: self.sorted_to_original.clone(),
        };
        let bytes = bincode::serialize(&payload)?;
        persistence::write_with_header(path, IndexType::RangeGraph, &bytes)
    }

    /// Load an index structure from disk and attach the vector store, which
    /// must hold the points in sorted order. Fails with `CountMismatch` or
    /// `DimensionMismatch` when the store disagrees with the payload.
    pub fn open(path: impl AsRef<Path>, store: VectorStore) -> Result<Self> {
        let bytes = persistence::read_verified(path, IndexType::RangeGraph)?;
        let payload: IndexPayload = bincode::deserialize(&bytes)?;

        if store.len() != payload.point_count as usize {
            return Err(RangeForgeError::count_mismatch(
                "vectors",
                payload.point_count as usize,
                store.len(),
            ));
        }
        if payload.point_count > 0 && store.dim() != payload.dimension as usize {
            return Err(RangeForgeError::dimension_mismatch(
                payload.dimension as usize,
                store.dim(),
            ));
        }

        let tree = RangeTree::from_parts(payload.tree_nodes, payload.point_count);
        Ok(Self {
            store,
            tree,
            graphs: payload.graphs,
            attributes: payload.attributes,
            sorted_to_original: payload.sorted_to_original,
            m: payload.m as usize,
            metric: payload.metric,
            ef_search: defaults::DEFAULT_EF_SEARCH,
        })
    }
}
