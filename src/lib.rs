//! range-forge: range-filtered approximate nearest neighbor search in Rust.
//!
//! Points carry a numeric attribute. A query asks for the k nearest
//! neighbors of a vector among only those points whose attribute falls in
//! an inclusive range. The index sorts points by attribute, builds a
//! balanced tree over sorted positions, and attaches a bounded-degree
//! proximity graph to every tree node; a query decomposes its range into
//! a minimal set of tree nodes, beam-searches each node's graph, and
//! merges the candidates into a global top-k.
//!
//! # Features
//!
//! - **SIMD Distance Functions**: AVX2/FMA and NEON optimized Euclidean and dot product
//! - **Automatic CPU Detection**: Falls back to scalar on unsupported hardware
//! - **Parallel Construction**: One graph per tree node, built across cores with Rayon
//! - **Brute Force Index**: Exact range-restricted search (ground truth baseline)
//! - **Persistence**: Checksummed binary index files, vectors re-attached at load
//!
//! # Example
//!
//! ```
//! use range_forge::{RangeForgeBuilder, Vector};
//!
//! let vectors: Vec<Vector> = (0..500).map(|i| Vector::random(i, 16)).collect();
//! let attributes: Vec<i64> = (0..500).collect();
//!
//! let index = RangeForgeBuilder::new(16, 100)
//!     .build(&vectors, &attributes)
//!     .unwrap();
//!
//! let query = Vector::random(9999, 16);
//! let results = index.search(&query.data, 100, 300, 10).unwrap();
//! assert!(results.len() <= 10);
//! ```

pub mod constants;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod index;
pub mod metrics;
pub mod persistence;
pub mod sort;
pub mod tree;
pub mod vector;

// Re-export commonly used types at crate root
pub use distance::DistanceMetric;
pub use error::{RangeForgeError, Result};
pub use index::{BruteForceIndex, InsertionOrder, RangeForgeBuilder, RangeForgeIndex, SearchResult};
pub use metrics::{recall, recall_at_k, ResourceMonitor, ResourceReport};
pub use sort::SortedDataset;
pub use tree::RangeTree;
pub use vector::{Vector, VectorStore};
