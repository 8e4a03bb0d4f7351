//! `SpladeModel`: the public encoder.
//!
//! ```text
//! texts ─► TokenizerAdapter ─► PaddedBatch ─► InferenceInvoker ─► OutputTensor ─► Vec<Embedding>
//! ```
//!
//! Inputs larger than `[batch] max_batch_size` are run in several forward
//! passes; the call still returns every embedding or none.

use std::path::PathBuf;
use std::sync::Arc;

use crate::assets::{ModelAssets, ModelManifest};
use crate::batch::PaddedBatch;
use crate::config::SpladeConfig;
use crate::engine::{EngineState, InferenceInvoker, InferenceRuntime, TensorBindings};
use crate::error::{EmbeddingError, EmbeddingResult};
use crate::similarity;
use crate::sparse::SparseVector;
use crate::tokenizer::TokenizerAdapter;
use crate::types::{Embedding, SimilarityMatrix, TokenEncoding};

/// SPLADE sparse encoder over a tokenizer and an inference session.
///
/// Synchronous: every method blocks the calling thread. Forward passes are
/// serialized per model, so the model can be shared across threads behind an
/// `Arc`.
///
/// # Example
///
/// ```rust,no_run
/// use splade_embeddings::SpladeModel;
///
/// # fn main() -> splade_embeddings::EmbeddingResult<()> {
/// let model = SpladeModel::builder()
///     .runtime_path("/opt/onnxruntime/lib/libonnxruntime.so")
///     .models_dir("./models/splade")
///     .build()?;
///
/// let queries = model.encode_query(&["How does aging affect memory?"])?;
/// let docs = model.encode_document(&[
///     "Aging changes the brain.",
///     "Memory declines with age.",
/// ])?;
/// let scores = model.similarity(&queries, &docs)?;
/// assert_eq!(scores.len(), 1);
///
/// model.close()?;
/// # Ok(())
/// # }
/// ```
pub struct SpladeModel {
    tokenizer: TokenizerAdapter,
    invoker: InferenceInvoker,
    manifest: ModelManifest,
    vocab_size: usize,
    max_batch_size: usize,
}

impl std::fmt::Debug for SpladeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpladeModel")
            .field("state", &self.state())
            .field("vocab_size", &self.vocab_size)
            .field("max_batch_size", &self.max_batch_size)
            .field("manifest", &self.manifest.manifest_hex())
            .finish()
    }
}

impl SpladeModel {
    /// Load with default configuration plus `SPLADE_*` environment overrides.
    ///
    /// # Errors
    /// See [`SpladeModelBuilder::build`].
    pub fn new() -> EmbeddingResult<Self> {
        Self::builder()
            .config(SpladeConfig::default().with_env_overrides())
            .build()
    }

    pub fn builder() -> SpladeModelBuilder {
        SpladeModelBuilder::default()
    }

    /// Encode queries. Special tokens are added.
    pub fn encode_query<S: AsRef<str>>(&self, queries: &[S]) -> EmbeddingResult<Vec<Embedding>> {
        self.compute_batch(queries, true)
    }

    /// Encode documents. Treated exactly like queries.
    pub fn encode_document<S: AsRef<str>>(
        &self,
        documents: &[S],
    ) -> EmbeddingResult<Vec<Embedding>> {
        self.compute_batch(documents, true)
    }

    /// Encode a single text.
    pub fn compute(&self, text: &str, add_special_tokens: bool) -> EmbeddingResult<Embedding> {
        self.compute_batch(&[text], add_special_tokens)?
            .pop()
            .ok_or_else(|| EmbeddingError::InternalError {
                message: "single-item batch produced no embedding".to_string(),
            })
    }

    /// Encode `texts` in order. An empty slice returns an empty result and
    /// never reaches the engine.
    ///
    /// # Errors
    /// - `EmbeddingError::TokenizationError` if any text fails to tokenize
    /// - `EmbeddingError::InvalidState` if the model is closed
    /// - `EmbeddingError::InferenceError` / `ShapeMismatch` from the engine
    pub fn compute_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        add_special_tokens: bool,
    ) -> EmbeddingResult<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let encodings = self.tokenizer.encode_batch(texts, add_special_tokens)?;
        self.compute_batch_from_encodings(&encodings)
    }

    /// Encode one pre-tokenized input.
    pub fn compute_from_encoding(&self, encoding: &TokenEncoding) -> EmbeddingResult<Embedding> {
        self.compute_batch_from_encodings(std::slice::from_ref(encoding))?
            .pop()
            .ok_or_else(|| EmbeddingError::InternalError {
                message: "single-item batch produced no embedding".to_string(),
            })
    }

    /// Encode pre-tokenized inputs, skipping the tokenizer.
    pub fn compute_batch_from_encodings(
        &self,
        encodings: &[TokenEncoding],
    ) -> EmbeddingResult<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(encodings.len());
        for chunk in encodings.chunks(self.max_batch_size) {
            let Some(batch) = PaddedBatch::from_encodings(chunk) else {
                continue;
            };
            let output = self.invoker.run(&batch)?;
            embeddings.extend(output.into_embeddings());
        }
        Ok(embeddings)
    }

    /// Dot-product scores `[queries.len(), documents.len()]`.
    ///
    /// # Errors
    /// - `EmbeddingError::DimensionMismatch` if any two embeddings differ in length
    pub fn similarity(
        &self,
        queries: &[Embedding],
        documents: &[Embedding],
    ) -> EmbeddingResult<SimilarityMatrix> {
        similarity::similarity(queries, documents)
    }

    /// Decode token ids to text.
    pub fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> EmbeddingResult<String> {
        self.tokenizer.decode(ids, skip_special_tokens)
    }

    /// The `k` heaviest vocabulary terms of `embedding`, heaviest first.
    ///
    /// Ids without a vocabulary entry are rendered as `[<id>]`.
    pub fn top_terms(&self, embedding: &[f32], k: usize) -> Vec<(String, f32)> {
        SparseVector::from_dense(embedding)
            .top_k(k)
            .into_iter()
            .map(|(index, weight)| {
                let term = u32::try_from(index)
                    .ok()
                    .and_then(|id| self.tokenizer.id_to_token(id))
                    .unwrap_or_else(|| format!("[{}]", index));
                (term, weight)
            })
            .collect()
    }

    /// Release the session and the runtime environment handle. Idempotent.
    pub fn close(&self) -> EmbeddingResult<()> {
        let was_open = !self.is_closed();
        self.invoker.close()?;
        if was_open {
            tracing::info!(manifest = %self.manifest.manifest_hex(), "SPLADE model closed");
        }
        Ok(())
    }

    pub fn state(&self) -> EngineState {
        self.invoker.state()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == EngineState::Closed
    }

    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }

    pub fn tokenizer(&self) -> &TokenizerAdapter {
        &self.tokenizer
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}

/// Builder for [`SpladeModel`].
#[derive(Default)]
pub struct SpladeModelBuilder {
    config: SpladeConfig,
    assets: Option<ModelAssets>,
    runtime: Option<Arc<dyn InferenceRuntime>>,
}

impl SpladeModelBuilder {
    /// Replace the whole configuration. Call before the per-field setters.
    pub fn config(mut self, config: SpladeConfig) -> Self {
        self.config = config;
        self
    }

    /// Explicit ONNX Runtime shared library.
    pub fn runtime_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.runtime.library_path = Some(path.into());
        self
    }

    /// Directory holding `tokenizer.json` and the model graph.
    pub fn models_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.model.models_dir = dir.into();
        self
    }

    /// Use these assets instead of reading `models_dir`.
    pub fn assets(mut self, assets: ModelAssets) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Use this inference runtime instead of ONNX Runtime.
    pub fn runtime(mut self, runtime: Arc<dyn InferenceRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Validate config, load assets and tokenizer, and open the session.
    ///
    /// Assets come from [`assets`](Self::assets) if given. Otherwise they are
    /// read from `models_dir`, except that with the `embedded-assets` feature a
    /// model left at the default directory uses the compiled-in assets.
    ///
    /// # Errors
    /// - `EmbeddingError::ConfigError` if the configuration is invalid
    /// - `EmbeddingError::AssetLoadError` if an asset cannot be read
    /// - `EmbeddingError::TokenizationError` if the tokenizer definition is corrupt
    /// - `EmbeddingError::EngineInitError` if the runtime or graph cannot be loaded
    pub fn build(self) -> EmbeddingResult<SpladeModel> {
        let Self {
            config,
            assets,
            runtime,
        } = self;
        config.validate()?;

        let assets = match assets {
            Some(assets) => assets,
            None => default_assets(&config)?,
        };
        let manifest = assets.manifest();

        let tokenizer = TokenizerAdapter::from_bytes(&assets.tokenizer, config.model.max_tokens)?;

        let runtime = match runtime {
            Some(runtime) => runtime,
            None => default_runtime(&config)?,
        };
        let runtime_name = runtime.name().to_string();

        let invoker = InferenceInvoker::new(
            runtime,
            assets.model_graph,
            TensorBindings::default(),
            config.model.vocab_size,
        );
        invoker.initialize()?;

        tracing::info!(
            runtime = %runtime_name,
            vocab_size = config.model.vocab_size,
            max_tokens = config.model.max_tokens,
            tokenizer_sha256 = %manifest.tokenizer_hex(),
            graph_sha256 = %manifest.graph_hex(),
            "SPLADE model loaded"
        );

        Ok(SpladeModel {
            tokenizer,
            invoker,
            manifest,
            vocab_size: config.model.vocab_size,
            max_batch_size: config.batch.max_batch_size,
        })
    }
}

#[cfg(feature = "embedded-assets")]
fn default_assets(config: &SpladeConfig) -> EmbeddingResult<ModelAssets> {
    if config.model.models_dir != crate::config::ModelConfig::default().models_dir {
        return ModelAssets::from_dir(&config.model);
    }
    tracing::debug!("Using embedded model assets");
    Ok(ModelAssets::embedded())
}

#[cfg(not(feature = "embedded-assets"))]
fn default_assets(config: &SpladeConfig) -> EmbeddingResult<ModelAssets> {
    ModelAssets::from_dir(&config.model)
}

#[cfg(feature = "onnx")]
fn default_runtime(config: &SpladeConfig) -> EmbeddingResult<Arc<dyn InferenceRuntime>> {
    let runtime = crate::engine::OnnxRuntime::new(&config.runtime)?;
    Ok(Arc::new(runtime))
}

#[cfg(not(feature = "onnx"))]
fn default_runtime(_config: &SpladeConfig) -> EmbeddingResult<Arc<dyn InferenceRuntime>> {
    Err(EmbeddingError::EngineInitError {
        message: "no inference runtime supplied and the `onnx` feature is disabled".to_string(),
    })
}
