//! Index construction: one bounded-degree proximity graph per tree node,
//! built in parallel across nodes.
//!
//! Within a node, points are inserted one at a time: each new point runs a
//! beam search of width `ef_construction` over the partial graph, its
//! nearest already-inserted points are filtered through a diversification
//! rule, and bidirectional edges are added with endpoints re-pruned back to
//! at most M neighbors. Across nodes there is no shared mutable state, so
//! the only synchronization point is the worker-pool drain.

use crate::constants::index as defaults;
use crate::distance::DistanceMetric;
use crate::error::{RangeForgeError, Result};
use crate::index::graph::{Candidate, NeighborList, NodeGraph};
use crate::index::search::RangeForgeIndex;
use crate::sort::sort_by_attribute;
use crate::tree::{RangeTree, TreeNode};
use crate::vector::{Vector, VectorStore};
use rand::seq::SliceRandom;
use rayon::prelude::*;

/// The order in which a node's points are fed to incremental insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionOrder {
    /// Sorted-position order (deterministic).
    Sorted,
    /// Uniformly shuffled order. Can improve graph navigability on data
    /// whose vectors correlate with the attribute.
    Shuffled,
}

/// Builder for [`RangeForgeIndex`].
///
/// `M` and `ef_construction` are required; everything else has defaults.
#[derive(Debug, Clone)]
pub struct RangeForgeBuilder {
    m: usize,
    ef_construction: usize,
    leaf_threshold: usize,
    threads: Option<usize>,
    insertion_order: InsertionOrder,
    metric: DistanceMetric,
}

impl Default for RangeForgeBuilder {
    fn default() -> Self {
        Self::new(defaults::DEFAULT_M, defaults::DEFAULT_EF_CONSTRUCTION)
    }
}

impl RangeForgeBuilder {
    /// Create a builder with the given degree bound and construction beam
    /// width. Both are validated in [`build`](Self::build) before any work.
    pub fn new(m: usize, ef_construction: usize) -> Self {
        Self {
            m,
            ef_construction,
            leaf_threshold: defaults::DEFAULT_LEAF_THRESHOLD,
            threads: None,
            insertion_order: InsertionOrder::Sorted,
            metric: DistanceMetric::Euclidean,
        }
    }

    /// Range length at or below which tree recursion stops.
    pub fn leaf_threshold(mut self, leaf_threshold: usize) -> Self {
        self.leaf_threshold = leaf_threshold;
        self
    }

    /// Upper bound on worker threads for parallel node construction.
    /// Defaults to the available hardware parallelism.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Insertion order within each node.
    pub fn insertion_order(mut self, order: InsertionOrder) -> Self {
        self.insertion_order = order;
        self
    }

    /// Distance metric used for graph construction and search.
    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Sort the points by attribute, build the range tree, and construct
    /// every node's proximity graph in parallel.
    ///
    /// Fails with `InvalidParameter` for non-positive M/ef_construction,
    /// `CountMismatch` when vector and attribute counts differ, and
    /// `DimensionMismatch` for ragged vector dimensions — all before graph
    /// work starts. An empty input yields an empty index.
    pub fn build(&self, vectors: &[Vector], attributes: &[i64]) -> Result<RangeForgeIndex> {
        if self.m == 0 {
            return Err(RangeForgeError::invalid_parameter(
                "M must be a positive integer",
            ));
        }
        if self.ef_construction == 0 {
            return Err(RangeForgeError::invalid_parameter(
                "ef_construction must be a positive integer",
            ));
        }

        let sorted = sort_by_attribute(vectors, attributes)?;
        let tree = RangeTree::build(sorted.store.len(), self.leaf_threshold);

        let threads = self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| RangeForgeError::invalid_parameter(e.to_string()))?;

        let store = &sorted.store;
        let graphs: Vec<NodeGraph> = pool.install(|| {
            tree.nodes()
                .par_iter()
                .map(|node| self.build_node_graph(store, node))
                .collect()
        });

        Ok(RangeForgeIndex::from_parts(
            sorted.store,
            tree,
            graphs,
            sorted.attributes,
            sorted.sorted_to_original,
            self.m,
            self.metric,
        ))
    }

    /// Build the proximity graph for one tree node. Strictly sequential;
    /// the graph only ever references positions inside the node's range.
    fn build_node_graph(&self, store: &VectorStore, node: &TreeNode) -> NodeGraph {
        let mut graph = NodeGraph::new(node.lo, node.hi);

        let mut order: Vec<u32> = (node.lo..node.hi).collect();
        if self.insertion_order == InsertionOrder::Shuffled {
            order.shuffle(&mut rand::thread_rng());
        }

        let Some((&first, rest)) = order.split_first() else {
            return graph;
        };
        graph.set_entry_point(first);

        for &point in rest {
            let candidates =
                graph.beam_search(store, self.metric, store.get(point), self.ef_construction);
            let neighbors = self.select_diverse(store, &candidates);

            for &neighbor in &neighbors {
                graph.link(point, neighbor);
                graph.link(neighbor, point);
                if graph.neighbors(neighbor).len() > self.m {
                    self.prune(store, &mut graph, neighbor);
                }
            }
        }

        graph
    }

    /// Diversification rule: walk candidates in ascending distance order and
    /// discard any candidate that is farther from the query point than some
    /// already-retained neighbor is from that candidate. This suppresses
    /// redundant near-duplicate edges and keeps the graph navigable.
    fn select_diverse(&self, store: &VectorStore, candidates: &[Candidate]) -> NeighborList {
        let mut kept = NeighborList::new();
        for c in candidates {
            if kept.len() >= self.m {
                break;
            }
            let diverse = kept.iter().all(|&r| {
                self.metric.compute(store.get(c.id), store.get(r)) >= c.distance
            });
            if diverse {
                kept.push(c.id);
            }
        }
        kept
    }

    /// Re-prune one point's neighbor list back to at most M edges using the
    /// same diversification rule, closest first.
    fn prune(&self, store: &VectorStore, graph: &mut NodeGraph, id: u32) {
        let point = store.get(id);
        let mut candidates: Vec<Candidate> = graph
            .neighbors(id)
            .iter()
            .map(|&n| Candidate {
                distance: self.metric.compute(point, store.get(n)),
                id: n,
            })
            .collect();
        candidates.sort();

        let kept = self.select_diverse(store, &candidates);
        *graph.neighbors_mut(id) = kept;
    }
}
