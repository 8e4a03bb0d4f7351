//! Tokenizer adapter over HuggingFace `tokenizers`.
//!
//! Produces unpadded [`TokenEncoding`]s: padding is owned by the batch
//! builder, so tokenizer-side padding is always switched off at load time.

use std::path::Path;

use tokenizers::{Tokenizer, TruncationParams};

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::types::TokenEncoding;

/// Read-only wrapper around a loaded tokenizer definition.
#[derive(Clone)]
pub struct TokenizerAdapter {
    inner: Tokenizer,
}

impl std::fmt::Debug for TokenizerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerAdapter")
            .field("vocab_size", &self.vocab_size())
            .finish()
    }
}

impl TokenizerAdapter {
    /// Load from `tokenizer.json` bytes.
    ///
    /// # Arguments
    /// * `bytes` - Serialized tokenizer definition
    /// * `max_tokens` - Truncation length (special tokens included)
    ///
    /// # Errors
    /// - `EmbeddingError::TokenizationError` if the definition is malformed
    pub fn from_bytes(bytes: &[u8], max_tokens: usize) -> EmbeddingResult<Self> {
        let inner = Tokenizer::from_bytes(bytes).map_err(|e| EmbeddingError::TokenizationError {
            message: format!("Failed to load tokenizer: {}", e),
        })?;
        Self::configure(inner, max_tokens)
    }

    /// Load from a `tokenizer.json` file.
    ///
    /// # Errors
    /// - `EmbeddingError::TokenizationError` if the file is missing or malformed
    pub fn from_file(path: impl AsRef<Path>, max_tokens: usize) -> EmbeddingResult<Self> {
        let path = path.as_ref();
        let inner = Tokenizer::from_file(path).map_err(|e| EmbeddingError::TokenizationError {
            message: format!("Failed to load tokenizer at {}: {}", path.display(), e),
        })?;
        Self::configure(inner, max_tokens)
    }

    fn configure(mut inner: Tokenizer, max_tokens: usize) -> EmbeddingResult<Self> {
        inner.with_padding(None);
        inner
            .with_truncation(Some(TruncationParams {
                max_length: max_tokens,
                ..Default::default()
            }))
            .map_err(|e| EmbeddingError::TokenizationError {
                message: format!("Invalid truncation length {}: {}", max_tokens, e),
            })?;
        Ok(Self { inner })
    }

    /// Encode one text.
    pub fn encode(&self, text: &str, add_special_tokens: bool) -> EmbeddingResult<TokenEncoding> {
        let encoding = self
            .inner
            .encode(text, add_special_tokens)
            .map_err(|e| EmbeddingError::TokenizationError {
                message: format!("Tokenization failed: {}", e),
            })?;
        TokenEncoding::new(
            encoding.get_ids().to_vec(),
            encoding.get_attention_mask().to_vec(),
        )
    }

    /// Encode a batch of texts, preserving order.
    pub fn encode_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        add_special_tokens: bool,
    ) -> EmbeddingResult<Vec<TokenEncoding>> {
        let inputs: Vec<&str> = texts.iter().map(AsRef::as_ref).collect();
        let encodings = self
            .inner
            .encode_batch(inputs, add_special_tokens)
            .map_err(|e| EmbeddingError::TokenizationError {
                message: format!("Batch tokenization failed: {}", e),
            })?;

        encodings
            .iter()
            .map(|e| TokenEncoding::new(e.get_ids().to_vec(), e.get_attention_mask().to_vec()))
            .collect()
    }

    /// Decode ids back to text, normalized by the tokenizer's decoder.
    pub fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> EmbeddingResult<String> {
        self.inner
            .decode(ids, skip_special_tokens)
            .map_err(|e| EmbeddingError::TokenizationError {
                message: format!("Decode failed: {}", e),
            })
    }

    /// Vocabulary string for `id`, if any.
    pub fn id_to_token(&self, id: u32) -> Option<String> {
        self.inner.id_to_token(id)
    }

    /// Vocabulary size including added tokens.
    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}
