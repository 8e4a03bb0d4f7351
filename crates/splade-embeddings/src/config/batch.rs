//! Batch configuration.

use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, EmbeddingResult};

fn default_max_batch_size() -> usize {
    32
}

/// Configuration for forward-pass batching.
///
/// Inputs beyond `max_batch_size` are split into consecutive forward passes.
/// The call is still all-or-nothing: if any pass fails, no embeddings are
/// returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of texts per forward pass.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl BatchConfig {
    /// Validate batch configuration values.
    ///
    /// # Errors
    /// - `EmbeddingError::ConfigError` if max_batch_size is 0
    pub fn validate(&self) -> EmbeddingResult<()> {
        if self.max_batch_size == 0 {
            return Err(EmbeddingError::ConfigError {
                message: "max_batch_size must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
