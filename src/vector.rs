use crate::error::{RangeForgeError, Result};
use rand::Rng;
use std::sync::Arc;

/// A vector with an ID and floating-point data.
/// The data is stored in an Arc for cheap cloning.
#[derive(Clone, Debug)]
pub struct Vector {
    pub id: u64,
    pub data: Arc<[f32]>,
}

impl Vector {
    /// Create a new vector with the given ID and data.
    pub fn new(id: u64, data: Vec<f32>) -> Self {
        Self {
            id,
            data: data.into(),
        }
    }

    /// Create a random vector with values uniformly distributed in [-1.0, 1.0].
    pub fn random(id: u64, dim: usize) -> Self {
        let mut rng = rand::thread_rng();
        let data: Vec<f32> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
        Self::new(id, data)
    }

    /// Return the dimensionality of this vector.
    pub fn dim(&self) -> usize {
        self.data.len()
    }
}

/// Flat, contiguous storage for a set of uniform-dimension vectors.
///
/// Points are addressed by their dense position, which after attribute
/// sorting is the sorted id used throughout the index. Contiguous storage
/// keeps distance computations cache-friendly.
#[derive(Clone, Debug, Default)]
pub struct VectorStore {
    data: Vec<f32>,
    dim: usize,
}

impl VectorStore {
    /// Create an empty store expecting vectors of the given dimension.
    pub fn new(dim: usize) -> Self {
        Self {
            data: Vec::new(),
            dim,
        }
    }

    /// Create a store with capacity for `n` vectors of the given dimension.
    pub fn with_capacity(dim: usize, n: usize) -> Self {
        Self {
            data: Vec::with_capacity(dim * n),
            dim,
        }
    }

    /// Append a vector. Fails with `DimensionMismatch` if its length does
    /// not match the store dimension.
    pub fn push(&mut self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(RangeForgeError::dimension_mismatch(self.dim, vector.len()));
        }
        self.data.extend_from_slice(vector);
        Ok(())
    }

    /// Get the vector at the given dense position.
    #[inline]
    pub fn get(&self, id: u32) -> &[f32] {
        let start = id as usize * self.dim;
        &self.data[start..start + self.dim]
    }

    /// Vector dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of vectors stored.
    #[inline]
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// True if no vectors are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
