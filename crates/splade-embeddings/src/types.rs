//! Constants and value types shared across the encoding pipeline.

use crate::error::{EmbeddingError, EmbeddingResult};

/// Output width of the bundled model (BERT vocabulary size).
pub const SPLADE_VOCAB_SIZE: usize = 30522;

/// Maximum tokens per input (BERT position embedding limit).
pub const SPLADE_MAX_TOKENS: usize = 512;

/// HuggingFace checkpoint the bundled graph was exported from.
pub const SPLADE_MODEL_NAME: &str = "naver/splade-cocondenser-ensembledistil";

/// Graph input holding padded token ids, shape `[batch, seq_len]`.
pub const INPUT_IDS_NAME: &str = "input_ids";

/// Graph input holding the padded attention mask, shape `[batch, seq_len]`.
pub const ATTENTION_MASK_NAME: &str = "attention_mask";

/// Graph output holding pooled sparse weights, shape `[batch, vocab_size]`.
pub const SPARSE_EMBEDDING_NAME: &str = "sparse_embedding";

/// Dense-stored sparse weight vector of length `vocab_size`.
pub type Embedding = Vec<f32>;

/// `[num_queries, num_docs]` dot-product scores.
pub type SimilarityMatrix = Vec<Vec<f32>>;

/// Token ids and attention mask for one input text.
///
/// # Invariants
/// - `ids.len() == attention_mask.len()`
/// - mask entries are 0 or 1
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenEncoding {
    ids: Vec<u32>,
    attention_mask: Vec<u32>,
}

impl TokenEncoding {
    /// Create an encoding from parallel id and mask sequences.
    ///
    /// # Errors
    /// - `EmbeddingError::DimensionMismatch` if the sequences differ in length
    pub fn new(ids: Vec<u32>, attention_mask: Vec<u32>) -> EmbeddingResult<Self> {
        if ids.len() != attention_mask.len() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: ids.len(),
                got: attention_mask.len(),
            });
        }
        Ok(Self {
            ids,
            attention_mask,
        })
    }

    /// Encoding with every position attended.
    pub fn from_ids(ids: Vec<u32>) -> Self {
        let attention_mask = vec![1; ids.len()];
        Self {
            ids,
            attention_mask,
        }
    }

    #[inline]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    #[inline]
    pub fn attention_mask(&self) -> &[u32] {
        &self.attention_mask
    }

    /// Number of tokens (special tokens included).
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
