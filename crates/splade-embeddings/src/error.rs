//! Error type for every stage of the sparse encoding pipeline.
//!
//! # Error Categories
//!
//! | Category | Variants | Caller Action |
//! |----------|----------|---------------|
//! | Setup | ConfigError, AssetLoadError, EngineInitError | Fix configuration or assets |
//! | Lifecycle | InvalidState | Do not use a closed model |
//! | Processing | TokenizationError, InferenceError | Treat the call as failed |
//! | Contract | ShapeMismatch, DimensionMismatch | Engine output or caller input is malformed |
//! | Infrastructure | InternalError, IoError | Report |
//!
//! Nothing is retried internally. A failed batch returns no embeddings at all.

use thiserror::Error;

use crate::engine::EngineState;

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Configuration parsing and validation.
    Config,
    /// Reading tokenizer or model-graph assets.
    Assets,
    /// Text to token ids.
    Tokenize,
    /// Padding token sequences into rectangular tensors.
    BuildBatch,
    /// Engine lifecycle (initialize, close, state checks).
    Lifecycle,
    /// Forward pass through the inference engine.
    Inference,
    /// Reshaping engine output into embeddings.
    Extract,
    /// Query/document scoring.
    Score,
}

impl PipelineStage {
    /// Returns the stage name as snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Config => "config",
            PipelineStage::Assets => "assets",
            PipelineStage::Tokenize => "tokenize",
            PipelineStage::BuildBatch => "build_batch",
            PipelineStage::Lifecycle => "lifecycle",
            PipelineStage::Inference => "inference",
            PipelineStage::Extract => "extract",
            PipelineStage::Score => "score",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the sparse encoding pipeline.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    // === Setup Errors ===
    /// Configuration file invalid or a value out of range.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Tokenizer definition or model graph could not be read.
    #[error("Failed to load model asset '{asset}': {source}")]
    AssetLoadError {
        asset: String,
        #[source]
        source: std::io::Error,
    },

    /// Runtime library missing or unloadable, or the model graph is invalid.
    #[error("Inference engine initialization failed: {message}")]
    EngineInitError { message: String },

    // === Lifecycle Errors ===
    /// Operation invoked on an engine that is not initialized or already closed.
    #[error("Cannot {operation} while engine is {state}")]
    InvalidState {
        operation: &'static str,
        state: EngineState,
    },

    // === Processing Errors ===
    /// Text could not be tokenized, or the tokenizer definition is corrupt.
    #[error("Tokenization error: {message}")]
    TokenizationError { message: String },

    /// The engine reported an execution fault.
    #[error("Inference failed: {message}")]
    InferenceError { message: String },

    // === Contract Errors ===
    /// Engine output element count differs from `batch_size * vocab_size`.
    #[error("Output shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Two vectors (or an id/mask pair) that must share a length do not.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    // === Infrastructure Errors ===
    /// Internal error (poisoned lock and similar).
    #[error("Internal error: {message}")]
    InternalError { message: String },

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EmbeddingError {
    /// Stage of the pipeline that failed.
    pub fn stage(&self) -> PipelineStage {
        match self {
            EmbeddingError::ConfigError { .. } => PipelineStage::Config,
            EmbeddingError::AssetLoadError { .. } | EmbeddingError::IoError(_) => {
                PipelineStage::Assets
            }
            EmbeddingError::EngineInitError { .. }
            | EmbeddingError::InvalidState { .. }
            | EmbeddingError::InternalError { .. } => PipelineStage::Lifecycle,
            EmbeddingError::TokenizationError { .. } => PipelineStage::Tokenize,
            EmbeddingError::InferenceError { .. } => PipelineStage::Inference,
            EmbeddingError::ShapeMismatch { .. } => PipelineStage::Extract,
            EmbeddingError::DimensionMismatch { .. } => PipelineStage::Score,
        }
    }
}

/// Result type alias for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;
