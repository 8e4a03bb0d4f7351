//! SPLADE sparse lexical embeddings.
//!
//! Turns text into vocabulary-sized weight vectors (30522 entries for the
//! bundled BERT checkpoint) and scores queries against documents by dot
//! product. Inference runs through ONNX Runtime loaded at runtime.
//!
//! # Architecture
//!
//! - **TokenizerAdapter**: text to unpadded token ids and masks
//! - **PaddedBatch**: right-padded `[batch, max_len]` `i64` tensors
//! - **InferenceInvoker**: session lifecycle and serialized forward passes
//! - **OutputTensor**: flat engine output split into per-text embeddings
//! - **SpladeModel**: the public façade tying these together
//!
//! # Example
//!
//! ```rust,no_run
//! use splade_embeddings::SpladeModel;
//!
//! # fn main() -> splade_embeddings::EmbeddingResult<()> {
//! let model = SpladeModel::builder().models_dir("./models/splade").build()?;
//! let q = model.encode_query(&["How does aging affect memory?"])?;
//! let d = model.encode_document(&["Memory declines with age."])?;
//! let scores = model.similarity(&q, &d)?;
//! println!("score = {}", scores[0][0]);
//! # Ok(())
//! # }
//! ```
//!
//! The library never installs a `tracing` subscriber.

pub mod assets;
pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod output;
pub mod similarity;
pub mod sparse;
pub mod tokenizer;
pub mod types;

pub use assets::{ModelAssets, ModelManifest};
pub use batch::{PaddedBatch, PaddedTensor};
pub use config::{BatchConfig, ModelConfig, RuntimeConfig, SpladeConfig};
pub use engine::{
    resolve_library_path, EngineState, InferenceInvoker, InferenceRuntime, InferenceSession,
    LibrarySource, RuntimeEnvironment, TensorBindings,
};
#[cfg(feature = "onnx")]
pub use engine::OnnxRuntime;
pub use error::{EmbeddingError, EmbeddingResult, PipelineStage};
pub use model::{SpladeModel, SpladeModelBuilder};
pub use output::OutputTensor;
pub use similarity::{dot_product, similarity};
pub use sparse::SparseVector;
pub use tokenizer::TokenizerAdapter;
pub use types::{
    Embedding, SimilarityMatrix, TokenEncoding, ATTENTION_MASK_NAME, INPUT_IDS_NAME,
    SPARSE_EMBEDDING_NAME, SPLADE_MAX_TOKENS, SPLADE_MODEL_NAME, SPLADE_VOCAB_SIZE,
};
