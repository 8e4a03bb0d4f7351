//! Compact view of a SPLADE embedding.
//!
//! SPLADE rows are stored densely (30522 floats) but typically have only a
//! few hundred non-zero entries. [`SparseVector`] keeps the active terms only.

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::types::SPLADE_VOCAB_SIZE;

/// Sparse vector with term indices and weights.
///
/// # Invariants
/// - `indices.len() == weights.len()`
/// - `indices` sorted ascending, all `< dimension`
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    /// Vocabulary indices with non-zero weight (sorted ascending).
    pub indices: Vec<usize>,
    /// Weight for each index.
    pub weights: Vec<f32>,
    /// Total number of dimensions (vocabulary size).
    pub dimension: usize,
}

impl SparseVector {
    /// Keep the strictly positive entries of a dense embedding.
    ///
    /// SPLADE weights are `log(1 + relu(x))`, so anything `<= 0` is inactive.
    pub fn from_dense(dense: &[f32]) -> Self {
        let (indices, weights) = dense
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w > 0.0)
            .map(|(i, &w)| (i, w))
            .unzip();
        Self {
            indices,
            weights,
            dimension: dense.len(),
        }
    }

    /// Get number of non-zero elements.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Ratio of zero entries, `1.0 - nnz / dimension`.
    pub fn sparsity(&self) -> f32 {
        if self.dimension == 0 {
            return 1.0;
        }
        1.0 - (self.indices.len() as f32 / self.dimension as f32)
    }

    /// Dot product by merging the two sorted index lists.
    ///
    /// # Errors
    /// - `EmbeddingError::DimensionMismatch` if the dimensions differ
    pub fn dot(&self, other: &SparseVector) -> EmbeddingResult<f32> {
        if self.dimension != other.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                got: other.dimension,
            });
        }

        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.weights[i] * other.weights[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        Ok(sum)
    }

    /// Expand back to a dense vector of length `dimension`.
    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0; self.dimension];
        for (&idx, &w) in self.indices.iter().zip(&self.weights) {
            dense[idx] = w;
        }
        dense
    }

    /// The `k` heaviest entries as `(index, weight)`, heaviest first.
    ///
    /// Ties are broken by ascending index so the order is deterministic.
    pub fn top_k(&self, k: usize) -> Vec<(usize, f32)> {
        let mut entries: Vec<(usize, f32)> = self
            .indices
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(k);
        entries
    }
}

impl Default for SparseVector {
    fn default() -> Self {
        Self {
            indices: Vec::new(),
            weights: Vec::new(),
            dimension: SPLADE_VOCAB_SIZE,
        }
    }
}
