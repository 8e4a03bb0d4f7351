//! Test fixtures for `splade-embeddings`.
//!
//! Builds real `SpladeModel`s without model files or a native runtime: a
//! WordLevel tokenizer definition stands in for the BERT vocabulary and
//! [`BagOfWordsRuntime`] stands in for the ONNX graph.

pub mod runtime;
pub mod tokenizer;

use std::sync::Arc;

use splade_embeddings::{EmbeddingResult, InferenceRuntime, ModelAssets, SpladeConfig, SpladeModel};

pub use runtime::{BagOfWordsRuntime, CallLog, Fault, FaultyRuntime};
pub use tokenizer::{fixture_tokenizer_json, word_id, FIXTURE_VOCAB_SIZE, SPECIAL_IDS};

/// Placeholder graph bytes; the fixture runtimes never parse them.
pub const FIXTURE_GRAPH: &[u8] = b"splade-fixture-graph";

pub fn fixture_assets() -> ModelAssets {
    ModelAssets::new(fixture_tokenizer_json().into_bytes(), FIXTURE_GRAPH.to_vec())
}

/// Config sized for the fixture vocabulary.
pub fn fixture_config(max_batch_size: usize) -> SpladeConfig {
    let mut config = SpladeConfig::default();
    config.model.vocab_size = FIXTURE_VOCAB_SIZE;
    config.batch.max_batch_size = max_batch_size;
    config
}

/// Model over the fixture assets and `runtime`.
pub fn fixture_model_with(
    runtime: Arc<dyn InferenceRuntime>,
    max_batch_size: usize,
) -> EmbeddingResult<SpladeModel> {
    SpladeModel::builder()
        .config(fixture_config(max_batch_size))
        .assets(fixture_assets())
        .runtime(runtime)
        .build()
}

/// Bag-of-words model and the log of its forward passes.
pub fn fixture_model() -> EmbeddingResult<(SpladeModel, CallLog)> {
    let runtime = BagOfWordsRuntime::new(FIXTURE_VOCAB_SIZE);
    let log = runtime.log();
    let model = fixture_model_with(Arc::new(runtime), 32)?;
    Ok((model, log))
}
