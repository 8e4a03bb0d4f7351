//! ONNX Runtime backend.

use std::borrow::Cow;
use std::sync::Arc;

use ort::session::{Session, SessionInputValue, SessionInputs};
use ort::value::TensorRef;

use super::environment::RuntimeEnvironment;
use super::{InferenceRuntime, InferenceSession, TensorBindings};
use crate::batch::PaddedBatch;
use crate::config::RuntimeConfig;
use crate::error::{EmbeddingError, EmbeddingResult};

fn init_error(context: &'static str) -> impl FnOnce(ort::Error) -> EmbeddingError {
    move |e| EmbeddingError::EngineInitError {
        message: format!("{}: {}", context, e),
    }
}

fn inference_error(context: &'static str) -> impl FnOnce(ort::Error) -> EmbeddingError {
    move |e| EmbeddingError::InferenceError {
        message: format!("{}: {}", context, e),
    }
}

/// Process environment for ONNX Runtime sessions.
#[derive(Debug, Clone)]
pub struct OnnxRuntime {
    environment: Arc<RuntimeEnvironment>,
    intra_threads: usize,
}

impl OnnxRuntime {
    /// Acquire the shared environment for `config.library_path`.
    ///
    /// # Errors
    /// - `EmbeddingError::EngineInitError` if the library path is invalid
    pub fn new(config: &RuntimeConfig) -> EmbeddingResult<Self> {
        let environment = RuntimeEnvironment::acquire(config.library_path.as_deref())?;
        Ok(Self {
            environment,
            intra_threads: config.intra_threads,
        })
    }

    pub fn environment(&self) -> &RuntimeEnvironment {
        &self.environment
    }
}

impl InferenceRuntime for OnnxRuntime {
    fn name(&self) -> &str {
        "onnxruntime"
    }

    fn create_session(
        &self,
        model_graph: &[u8],
        bindings: &TensorBindings,
    ) -> EmbeddingResult<Box<dyn InferenceSession>> {
        let mut builder = Session::builder().map_err(init_error("session builder"))?;
        if self.intra_threads > 0 {
            builder = builder
                .with_intra_threads(self.intra_threads)
                .map_err(|e| EmbeddingError::EngineInitError {
                    message: format!("intra threads: {}", e),
                })?;
        }
        let session = builder
            .commit_from_memory(model_graph)
            .map_err(|e| EmbeddingError::EngineInitError {
                message: format!("model graph load: {}", e),
            })?;
        tracing::debug!(bytes = model_graph.len(), "ONNX session committed");

        let inputs: Vec<&str> = session.inputs.iter().map(|i| i.name.as_str()).collect();
        let outputs: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
        check_bindings(&inputs, &outputs, bindings)?;

        Ok(Box::new(OnnxSession {
            session,
            bindings: bindings.clone(),
        }))
    }
}

/// Fail unless the graph exposes every bound input and output name.
fn check_bindings(inputs: &[&str], outputs: &[&str], bindings: &TensorBindings) -> EmbeddingResult<()> {
    let missing: Vec<&str> = [
        (inputs, bindings.input_ids.as_str()),
        (inputs, bindings.attention_mask.as_str()),
        (outputs, bindings.output.as_str()),
    ]
    .into_iter()
    .filter(|(names, wanted)| !names.contains(wanted))
    .map(|(_, wanted)| wanted)
    .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(EmbeddingError::EngineInitError {
        message: format!(
            "model graph is missing tensors {:?} (inputs {:?}, outputs {:?})",
            missing, inputs, outputs
        ),
    })
}

struct OnnxSession {
    session: Session,
    bindings: TensorBindings,
}

impl OnnxSession {
    fn inputs<'a>(&self, batch: &'a PaddedBatch) -> EmbeddingResult<SessionInputs<'a, 'a>> {
        let shape = batch.shape();
        let ids = TensorRef::from_array_view((shape, batch.input_ids().as_slice()))
            .map_err(inference_error("input_ids tensor"))?;
        let mask = TensorRef::from_array_view((shape, batch.attention_mask().as_slice()))
            .map_err(inference_error("attention_mask tensor"))?;

        let inputs: Vec<(Cow<'a, str>, SessionInputValue<'a>)> = vec![
            (Cow::Owned(self.bindings.input_ids.clone()), ids.into()),
            (Cow::Owned(self.bindings.attention_mask.clone()), mask.into()),
        ];
        Ok(inputs.into())
    }
}

impl InferenceSession for OnnxSession {
    fn run(&mut self, batch: &PaddedBatch) -> EmbeddingResult<Vec<f32>> {
        let inputs = self.inputs(batch)?;
        let outputs = self
            .session
            .run(inputs)
            .map_err(inference_error("forward pass"))?;

        let output = outputs
            .get(self.bindings.output.as_str())
            .ok_or_else(|| EmbeddingError::InferenceError {
                message: format!("output '{}' missing from run", self.bindings.output),
            })?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(inference_error("output extract"))?;

        Ok(data.to_vec())
    }
}
