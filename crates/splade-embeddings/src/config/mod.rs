//! Root configuration for the sparse encoder.
//!
//! # Loading Configuration
//!
//! ```
//! use splade_embeddings::SpladeConfig;
//!
//! let config = SpladeConfig::default();
//! config.validate().expect("Default config should be valid");
//!
//! // With environment overrides
//! let config = SpladeConfig::default().with_env_overrides();
//! ```
//!
//! # TOML Structure
//!
//! ```toml
//! [model]
//! models_dir = "./models/splade"
//! vocab_size = 30522
//! max_tokens = 512
//!
//! [runtime]
//! library_path = "/opt/onnxruntime/lib/libonnxruntime.so"
//! intra_threads = 4
//!
//! [batch]
//! max_batch_size = 32
//! ```
//!
//! Invalid config returns an error; nothing is silently defaulted.

mod batch;
mod model;
mod runtime;

pub use batch::BatchConfig;
pub use model::ModelConfig;
pub use runtime::RuntimeConfig;

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, EmbeddingResult};

/// Environment variable naming the ONNX Runtime shared library.
pub const RUNTIME_LIBRARY_ENV: &str = "ONNXRUNTIME_LIB_PATH";

// ============================================================================
// ROOT SPLADE CONFIG
// ============================================================================

/// Root configuration for the sparse encoder.
///
/// # Example
///
/// ```
/// use splade_embeddings::SpladeConfig;
///
/// let config = SpladeConfig::default();
/// config.validate().expect("Default config valid");
/// assert_eq!(config.model.vocab_size, 30522);
/// assert!(config.batch.max_batch_size > 0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpladeConfig {
    /// Model assets and output shape
    #[serde(default)]
    pub model: ModelConfig,

    /// Native runtime location and threading
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Forward-pass batching
    #[serde(default)]
    pub batch: BatchConfig,
}

impl SpladeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// - `EmbeddingError::ConfigError` if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> EmbeddingResult<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| EmbeddingError::ConfigError {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let config: Self = toml::from_str(&contents).map_err(|e| EmbeddingError::ConfigError {
            message: format!("Failed to parse TOML in '{}': {}", path.display(), e),
        })?;

        Ok(config)
    }

    /// Create configuration from TOML string.
    ///
    /// # Errors
    /// - `EmbeddingError::ConfigError` if TOML parsing fails
    pub fn from_toml_str(toml: &str) -> EmbeddingResult<Self> {
        toml::from_str(toml).map_err(|e| EmbeddingError::ConfigError {
            message: format!("Failed to parse TOML: {}", e),
        })
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    /// - `EmbeddingError::ConfigError` if serialization fails
    pub fn to_toml_string(&self) -> EmbeddingResult<String> {
        toml::to_string_pretty(self).map_err(|e| EmbeddingError::ConfigError {
            message: format!("Failed to serialize to TOML: {}", e),
        })
    }

    /// Validate all configuration values, returning the first error found.
    pub fn validate(&self) -> EmbeddingResult<()> {
        self.model
            .validate()
            .map_err(|e| EmbeddingError::ConfigError {
                message: format!("[model] {}", e),
            })?;

        self.runtime
            .validate()
            .map_err(|e| EmbeddingError::ConfigError {
                message: format!("[runtime] {}", e),
            })?;

        self.batch
            .validate()
            .map_err(|e| EmbeddingError::ConfigError {
                message: format!("[batch] {}", e),
            })?;

        Ok(())
    }

    /// Apply environment variable overrides. Prefix: `SPLADE_`
    ///
    /// | Variable | Config Path | Type |
    /// |----------|-------------|------|
    /// | `SPLADE_MODELS_DIR` | `model.models_dir` | String |
    /// | `SPLADE_MAX_TOKENS` | `model.max_tokens` | usize |
    /// | `SPLADE_INTRA_THREADS` | `runtime.intra_threads` | usize |
    /// | `SPLADE_MAX_BATCH_SIZE` | `batch.max_batch_size` | usize |
    ///
    /// Unparseable values are ignored. The runtime library path is not
    /// overridden here: `ONNXRUNTIME_LIB_PATH` only applies when no explicit
    /// path is configured, see [`crate::engine::resolve_library_path`].
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = env::var("SPLADE_MODELS_DIR") {
            self.model.models_dir = val;
        }
        if let Ok(val) = env::var("SPLADE_MAX_TOKENS") {
            if let Ok(n) = val.parse::<usize>() {
                self.model.max_tokens = n;
            }
        }
        if let Ok(val) = env::var("SPLADE_INTRA_THREADS") {
            if let Ok(n) = val.parse::<usize>() {
                self.runtime.intra_threads = n;
            }
        }
        if let Ok(val) = env::var("SPLADE_MAX_BATCH_SIZE") {
            if let Ok(n) = val.parse::<usize>() {
                self.batch.max_batch_size = n;
            }
        }
        self
    }
}
