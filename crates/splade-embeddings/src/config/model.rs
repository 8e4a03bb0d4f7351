//! Model asset configuration.
//!
//! Where the tokenizer definition and model graph live, and the fixed shape
//! parameters tied to the bundled checkpoint.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::types::{SPLADE_MAX_TOKENS, SPLADE_VOCAB_SIZE};

// ============================================================================
// DEFAULT FUNCTIONS
// ============================================================================

fn default_models_dir() -> String {
    "./models/splade".to_string()
}

fn default_tokenizer_file() -> String {
    "tokenizer.json".to_string()
}

fn default_graph_file() -> String {
    "splade_pooled.onnx".to_string()
}

fn default_vocab_size() -> usize {
    SPLADE_VOCAB_SIZE
}

fn default_max_tokens() -> usize {
    SPLADE_MAX_TOKENS
}

// ============================================================================
// MODEL CONFIG
// ============================================================================

/// Configuration for model assets and output shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Directory containing `tokenizer_file` and `graph_file`.
    /// Relative paths are resolved from working directory.
    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    /// Tokenizer definition (HuggingFace `tokenizer.json`).
    #[serde(default = "default_tokenizer_file")]
    pub tokenizer_file: String,

    /// ONNX graph exporting pooled SPLADE weights.
    #[serde(default = "default_graph_file")]
    pub graph_file: String,

    /// Width of each output row. Must match the graph's `sparse_embedding`.
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,

    /// Inputs longer than this are truncated by the tokenizer.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            tokenizer_file: default_tokenizer_file(),
            graph_file: default_graph_file(),
            vocab_size: default_vocab_size(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ModelConfig {
    /// Full path of the tokenizer definition.
    pub fn tokenizer_path(&self) -> PathBuf {
        PathBuf::from(&self.models_dir).join(&self.tokenizer_file)
    }

    /// Full path of the model graph.
    pub fn graph_path(&self) -> PathBuf {
        PathBuf::from(&self.models_dir).join(&self.graph_file)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// - `EmbeddingError::ConfigError` if any path is empty
    /// - `EmbeddingError::ConfigError` if `vocab_size` or `max_tokens` is 0
    pub fn validate(&self) -> EmbeddingResult<()> {
        if self.models_dir.is_empty() {
            return Err(EmbeddingError::ConfigError {
                message: "models_dir cannot be empty".to_string(),
            });
        }
        if self.tokenizer_file.is_empty() || self.graph_file.is_empty() {
            return Err(EmbeddingError::ConfigError {
                message: "tokenizer_file and graph_file cannot be empty".to_string(),
            });
        }
        if self.vocab_size == 0 {
            return Err(EmbeddingError::ConfigError {
                message: "vocab_size must be > 0".to_string(),
            });
        }
        if self.max_tokens == 0 {
            return Err(EmbeddingError::ConfigError {
                message: "max_tokens must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
