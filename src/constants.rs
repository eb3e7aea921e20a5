//! Named constants for configuration values.
//!
//! This module centralizes magic numbers and default values used throughout
//! the codebase, making them easier to find, document, and tune.

/// Constants for index construction and search.
pub mod index {
    /// Default max neighbor count per point after pruning.
    pub const DEFAULT_M: usize = 16;

    /// Default beam width during graph construction.
    pub const DEFAULT_EF_CONSTRUCTION: usize = 100;

    /// Default beam width during search.
    pub const DEFAULT_EF_SEARCH: usize = 50;

    /// Default range length at or below which tree recursion stops.
    /// Leaves of this size are small enough that graph traversal degenerates
    /// gracefully toward exhaustive search within the leaf.
    pub const DEFAULT_LEAF_THRESHOLD: usize = 64;

    /// Inline capacity for neighbor lists. Sized so typical M values avoid
    /// a heap allocation per point.
    pub const INLINE_NEIGHBORS: usize = 16;
}

/// Constants for the background resource monitor.
pub mod monitor {
    /// Interval between samples of `/proc/self/status`.
    pub const SAMPLE_INTERVAL_MS: u64 = 10;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_positive() {
        assert!(index::DEFAULT_M > 0);
        assert!(index::DEFAULT_EF_CONSTRUCTION > 0);
        assert!(index::DEFAULT_LEAF_THRESHOLD > 0);
    }
}
