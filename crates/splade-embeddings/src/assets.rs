//! Model assets and provenance.
//!
//! Two files make up a SPLADE model: the tokenizer definition and the
//! serialized graph whose single output is already max-pooled to
//! `[batch, vocab]`. They are read from `[model] models_dir`, or compiled in
//! with the `embedded-assets` feature.

use sha2::{Digest, Sha256};

use crate::config::ModelConfig;
use crate::error::{EmbeddingError, EmbeddingResult};
use crate::types::SPLADE_MODEL_NAME;

#[cfg(feature = "embedded-assets")]
const EMBEDDED_TOKENIZER: &[u8] = include_bytes!("../assets/tokenizer.json");
#[cfg(feature = "embedded-assets")]
const EMBEDDED_GRAPH: &[u8] = include_bytes!("../assets/splade_pooled.onnx");

/// Raw tokenizer and model-graph bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct ModelAssets {
    pub tokenizer: Vec<u8>,
    pub model_graph: Vec<u8>,
}

impl std::fmt::Debug for ModelAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelAssets")
            .field("tokenizer_bytes", &self.tokenizer.len())
            .field("model_graph_bytes", &self.model_graph.len())
            .finish()
    }
}

impl ModelAssets {
    pub fn new(tokenizer: Vec<u8>, model_graph: Vec<u8>) -> Self {
        Self {
            tokenizer,
            model_graph,
        }
    }

    /// Read both assets from the configured model directory.
    ///
    /// # Errors
    /// - `EmbeddingError::AssetLoadError` naming the file that could not be read
    pub fn from_dir(config: &ModelConfig) -> EmbeddingResult<Self> {
        let read = |path: std::path::PathBuf| {
            std::fs::read(&path).map_err(|source| EmbeddingError::AssetLoadError {
                asset: path.display().to_string(),
                source,
            })
        };
        let tokenizer = read(config.tokenizer_path())?;
        let model_graph = read(config.graph_path())?;
        Ok(Self::new(tokenizer, model_graph))
    }

    /// Assets compiled into the binary.
    #[cfg(feature = "embedded-assets")]
    pub fn embedded() -> Self {
        Self::new(EMBEDDED_TOKENIZER.to_vec(), EMBEDDED_GRAPH.to_vec())
    }

    /// Digest both assets.
    pub fn manifest(&self) -> ModelManifest {
        ModelManifest::new(
            SPLADE_MODEL_NAME.to_string(),
            sha256(&self.tokenizer),
            sha256(&self.model_graph),
        )
    }
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Provenance of a loaded model: which tokenizer and graph produced its
/// embeddings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelManifest {
    pub model_id: String,
    pub tokenizer_hash: [u8; 32],
    pub graph_hash: [u8; 32],
    pub manifest_hash: [u8; 32],
}

impl ModelManifest {
    pub fn new(model_id: String, tokenizer_hash: [u8; 32], graph_hash: [u8; 32]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(model_id.as_bytes());
        hasher.update(tokenizer_hash);
        hasher.update(graph_hash);
        let manifest_hash = hasher.finalize().into();

        Self {
            model_id,
            tokenizer_hash,
            graph_hash,
            manifest_hash,
        }
    }

    pub fn tokenizer_hex(&self) -> String {
        to_hex(&self.tokenizer_hash)
    }

    pub fn graph_hex(&self) -> String {
        to_hex(&self.graph_hash)
    }

    pub fn manifest_hex(&self) -> String {
        to_hex(&self.manifest_hash)
    }
}
