//! Index implementations for range-filtered similarity search.

pub mod brute_force;
pub mod builder;
pub mod graph;
pub mod search;

pub use brute_force::BruteForceIndex;
pub use builder::{InsertionOrder, RangeForgeBuilder};
pub use graph::{Candidate, NodeGraph};
pub use search::{RangeForgeIndex, SearchResult};
