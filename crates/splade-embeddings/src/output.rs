//! Embedding extractor.
//!
//! The engine returns one flat `[batch_size * vocab_size]` buffer. This module
//! validates it once and splits it into owned per-item embeddings.

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::types::Embedding;

/// Flat `f32` engine output of shape `[batch_size, vocab_size]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTensor {
    data: Vec<f32>,
    batch_size: usize,
    vocab_size: usize,
}

impl OutputTensor {
    /// Wrap a flat engine buffer after checking its element count.
    ///
    /// # Errors
    /// - `EmbeddingError::ShapeMismatch` if `data.len() != batch_size * vocab_size`
    pub fn from_flat(data: Vec<f32>, batch_size: usize, vocab_size: usize) -> EmbeddingResult<Self> {
        let expected = batch_size * vocab_size;
        if data.len() != expected {
            return Err(EmbeddingError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            batch_size,
            vocab_size,
        })
    }

    /// `[batch_size, vocab_size]`.
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        [self.batch_size, self.vocab_size]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Row `b` as a borrowed slice.
    pub fn row(&self, b: usize) -> Option<&[f32]> {
        if b >= self.batch_size {
            return None;
        }
        let start = b * self.vocab_size;
        Some(&self.data[start..start + self.vocab_size])
    }

    /// Split into `batch_size` independent embeddings, in batch order.
    ///
    /// Each row is copied, so the result never shares storage with the
    /// buffer the engine filled.
    pub fn into_embeddings(self) -> Vec<Embedding> {
        if self.vocab_size == 0 {
            return vec![Vec::new(); self.batch_size];
        }
        self.data
            .chunks_exact(self.vocab_size)
            .map(<[f32]>::to_vec)
            .collect()
    }
}
