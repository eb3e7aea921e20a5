//! Balanced binary interval tree over sorted positions.
//!
//! Nodes live in an arena and reference their children by index, which
//! keeps ownership simple, serialization flat, and parallel per-node work
//! free of aliasing concerns. Each node owns a contiguous half-open range
//! `[lo, hi)`; the two children of a node partition its range exactly at
//! the midpoint. Recursion stops once a range length falls at or below the
//! configured leaf threshold.
//!
//! Every position belongs to exactly one node per tree level, so it is
//! covered by O(log n) node ranges in total. That replication is what lets
//! a query range be answered from a logarithmic number of independent
//! proximity graphs.

use serde::{Deserialize, Serialize};

/// One node of the range tree: a half-open position range plus arena
/// indices of its children. Leaves have no children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub lo: u32,
    pub hi: u32,
    pub left: Option<u32>,
    pub right: Option<u32>,
}

impl TreeNode {
    /// Number of positions owned by this node.
    #[inline]
    pub fn len(&self) -> usize {
        (self.hi - self.lo) as usize
    }

    /// True for degenerate zero-length ranges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hi == self.lo
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Arena-backed balanced interval tree over `[0, n)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTree {
    nodes: Vec<TreeNode>,
    len: u32,
}

impl RangeTree {
    /// Build the tree over `n` sorted positions, splitting ranges at their
    /// midpoint until they fall at or below `leaf_threshold`. `n = 0`
    /// produces an empty tree with no nodes.
    pub fn build(n: usize, leaf_threshold: usize) -> Self {
        let leaf_threshold = leaf_threshold.max(1);
        let mut nodes = Vec::new();
        if n > 0 {
            Self::split(&mut nodes, 0, n as u32, leaf_threshold as u32);
        }
        Self {
            nodes,
            len: n as u32,
        }
    }

    fn split(nodes: &mut Vec<TreeNode>, lo: u32, hi: u32, leaf_threshold: u32) -> u32 {
        let index = nodes.len() as u32;
        nodes.push(TreeNode {
            lo,
            hi,
            left: None,
            right: None,
        });

        if hi - lo > leaf_threshold {
            let mid = lo + (hi - lo) / 2;
            let left = Self::split(nodes, lo, mid, leaf_threshold);
            let right = Self::split(nodes, mid, hi, leaf_threshold);
            nodes[index as usize].left = Some(left);
            nodes[index as usize].right = Some(right);
        }

        index
    }

    /// Reassemble a tree from its serialized arena.
    pub(crate) fn from_parts(nodes: Vec<TreeNode>, len: u32) -> Self {
        Self { nodes, len }
    }

    /// Arena index of the root, if the tree is non-empty.
    #[inline]
    pub fn root(&self) -> Option<usize> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    #[inline]
    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    #[inline]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Number of nodes in the arena.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of positions covered by the root range.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decompose the query range `[lo, hi)` into the minimal set of tree
    /// nodes covering it.
    ///
    /// A node contained in the query range is taken whole and not descended
    /// further; a disjoint node is pruned; a partially overlapping node is
    /// descended into both children. A partially overlapping leaf is taken
    /// whole, so at most the two boundary members may extend past the query
    /// range by less than the leaf threshold; callers searching those
    /// members must filter candidates by position. The result is pairwise
    /// disjoint, contains no ancestor/descendant pair, its union contains
    /// `[lo, hi) ∩ [0, n)`, and it has O(log n) members. `lo >= hi` yields
    /// an empty cover.
    pub fn cover(&self, lo: usize, hi: usize) -> Vec<usize> {
        let mut out = Vec::new();
        if lo >= hi {
            return out;
        }
        if let Some(root) = self.root() {
            self.cover_rec(root, lo as u32, (hi.min(self.len())) as u32, &mut out);
        }
        out
    }

    fn cover_rec(&self, index: usize, lo: u32, hi: u32, out: &mut Vec<usize>) {
        let node = &self.nodes[index];
        if node.hi <= lo || node.lo >= hi {
            return;
        }
        if lo <= node.lo && node.hi <= hi {
            out.push(index);
            return;
        }
        match (node.left, node.right) {
            (Some(left), Some(right)) => {
                self.cover_rec(left as usize, lo, hi, out);
                self.cover_rec(right as usize, lo, hi, out);
            }
            // Boundary leaf straddling a query endpoint.
            _ => out.push(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree() {
        let tree = RangeTree::build(0, 8);
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
        assert!(tree.root().is_none());
        assert!(tree.cover(0, 10).is_empty());
    }

    #[test]
    fn test_single_point() {
        let tree = RangeTree::build(1, 8);
        assert_eq!(tree.node_count(), 1);
        let root = tree.node(tree.root().unwrap());
        assert_eq!((root.lo, root.hi), (0, 1));
        assert!(root.is_leaf());
    }

    #[test]
    fn test_children_partition_parent() {
        let tree = RangeTree::build(1000, 16);
        for node in tree.nodes() {
            match (node.left, node.right) {
                (Some(l), Some(r)) => {
                    let left = tree.node(l as usize);
                    let right = tree.node(r as usize);
                    assert_eq!(left.lo, node.lo);
                    assert_eq!(left.hi, right.lo);
                    assert_eq!(right.hi, node.hi);
                }
                (None, None) => assert!(node.len() <= 16),
                _ => panic!("node with exactly one child"),
            }
        }
    }

    #[test]
    fn test_balanced_depth() {
        let n = 1024;
        let leaf = 16;
        let tree = RangeTree::build(n, leaf);
        // A perfectly balanced split of 1024 down to 16 gives 64 leaves and
        // 127 nodes in total.
        assert_eq!(tree.node_count(), 127);
    }

    fn check_cover(tree: &RangeTree, lo: usize, hi: usize, leaf_threshold: usize) {
        let cover = tree.cover(lo, hi);

        // Disjoint, contiguous, and sorted by range.
        let mut ranges: Vec<(u32, u32)> = cover
            .iter()
            .map(|&i| (tree.node(i).lo, tree.node(i).hi))
            .collect();
        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0, "gap or overlap between cover members");
        }

        // Union contains the clipped query range, overhanging it by less
        // than a leaf length on each side.
        let clipped_lo = lo.min(tree.len());
        let clipped_hi = hi.min(tree.len());
        if clipped_hi > clipped_lo {
            let first = ranges.first().unwrap().0 as usize;
            let last = ranges.last().unwrap().1 as usize;
            assert!(first <= clipped_lo && clipped_lo < first + leaf_threshold);
            assert!(clipped_hi <= last && last < clipped_hi + leaf_threshold);
            // Every member intersects the query range.
            for &(a, b) in &ranges {
                assert!((a as usize) < clipped_hi && clipped_lo < b as usize);
            }
        } else {
            assert!(ranges.is_empty());
        }
    }

    #[test]
    fn test_cover_properties_exhaustive_small() {
        let tree = RangeTree::build(37, 4);
        for lo in 0..=37 {
            for hi in lo..=40 {
                check_cover(&tree, lo, hi, 4);
            }
        }
    }

    #[test]
    fn test_cover_aligned_range_is_exact() {
        // A query range aligned to node boundaries needs no boundary leaves.
        let tree = RangeTree::build(64, 4);
        let cover = tree.cover(0, 32);
        let total: usize = cover.iter().map(|&i| tree.node(i).len()).sum();
        assert_eq!(total, 32);
    }

    #[test]
    fn test_cover_no_ancestor_descendant() {
        let tree = RangeTree::build(500, 8);
        let cover = tree.cover(13, 471);
        for &a in &cover {
            for &b in &cover {
                if a == b {
                    continue;
                }
                let (na, nb) = (tree.node(a), tree.node(b));
                let nested = na.lo <= nb.lo && nb.hi <= na.hi;
                assert!(!nested, "cover contains nested ranges");
            }
        }
    }

    #[test]
    fn test_cover_logarithmic_size() {
        let n = 1 << 16;
        let tree = RangeTree::build(n, 32);
        let cover = tree.cover(1, n - 1);
        // At most two boundary nodes per level.
        let depth = (n as f64 / 32.0).log2().ceil() as usize + 1;
        assert!(cover.len() <= 2 * depth, "cover size {} too large", cover.len());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let tree = RangeTree::build(100, 8);
        assert!(tree.cover(50, 50).is_empty());
        assert!(tree.cover(70, 30).is_empty());
    }

    #[test]
    fn test_cover_clips_to_domain() {
        let tree = RangeTree::build(10, 2);
        check_cover(&tree, 5, 500, 2);
    }
}
