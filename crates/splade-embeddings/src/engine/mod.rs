//! Inference engine boundary.
//!
//! The tensor engine is consumed through two capability traits so the
//! pipeline does not depend on a particular native binding:
//!
//! ```text
//! InferenceRuntime (process environment)
//! └── create_session(graph, bindings) -> Box<dyn InferenceSession>
//!
//! InferenceSession (one loaded graph)
//! └── run(&PaddedBatch) -> Vec<f32>        // flat [batch, vocab]
//!
//! InferenceInvoker (lifecycle owner)
//! ├── initialize()   Uninitialized -> Initialized
//! ├── run(&PaddedBatch) -> OutputTensor   (shape-checked, serialized)
//! └── close()        * -> Closed          (idempotent)
//! ```
//!
//! `OnnxRuntime` (feature `onnx`) implements the traits over ONNX Runtime.

mod environment;
mod invoker;
#[cfg(feature = "onnx")]
mod onnx;

pub use environment::{resolve_library_path, LibrarySource, RuntimeEnvironment};
pub use invoker::InferenceInvoker;
#[cfg(feature = "onnx")]
pub use onnx::OnnxRuntime;

use crate::batch::PaddedBatch;
use crate::error::EmbeddingResult;
use crate::types::{ATTENTION_MASK_NAME, INPUT_IDS_NAME, SPARSE_EMBEDDING_NAME};

/// Lifecycle state of an [`InferenceInvoker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Constructed, no session yet.
    Uninitialized,
    /// Session open, `run` allowed.
    Initialized,
    /// Session released. Terminal.
    Closed,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initialized => "initialized",
            EngineState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Graph tensor names a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorBindings {
    pub input_ids: String,
    pub attention_mask: String,
    pub output: String,
}

impl Default for TensorBindings {
    fn default() -> Self {
        Self {
            input_ids: INPUT_IDS_NAME.to_string(),
            attention_mask: ATTENTION_MASK_NAME.to_string(),
            output: SPARSE_EMBEDDING_NAME.to_string(),
        }
    }
}

/// Process-level engine: owns whatever environment the native library needs
/// and opens sessions over a serialized model graph.
pub trait InferenceRuntime: Send + Sync {
    /// Short identifier for logs (e.g. `"onnxruntime"`).
    fn name(&self) -> &str;

    /// Load `model_graph` and bind it to `bindings`.
    ///
    /// # Errors
    /// - `EmbeddingError::EngineInitError` if the graph is invalid or the
    ///   runtime cannot create a session
    fn create_session(
        &self,
        model_graph: &[u8],
        bindings: &TensorBindings,
    ) -> EmbeddingResult<Box<dyn InferenceSession>>;
}

/// One loaded graph. Not assumed to be re-entrant; callers serialize access.
pub trait InferenceSession: Send {
    /// Execute one synchronous forward pass.
    ///
    /// Returns the bound output tensor as a flat row-major buffer copied out
    /// of engine memory. Its length is checked by the caller.
    ///
    /// # Errors
    /// - `EmbeddingError::InferenceError` if the engine reports a fault
    fn run(&mut self, batch: &PaddedBatch) -> EmbeddingResult<Vec<f32>>;
}
