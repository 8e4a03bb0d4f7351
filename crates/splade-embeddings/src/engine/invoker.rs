//! Lifecycle owner for one inference session.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{EngineState, InferenceRuntime, InferenceSession, TensorBindings};
use crate::batch::PaddedBatch;
use crate::error::{EmbeddingError, EmbeddingResult};
use crate::output::OutputTensor;

enum InvokerState {
    Uninitialized {
        runtime: Arc<dyn InferenceRuntime>,
        model_graph: Vec<u8>,
    },
    Initialized {
        session: Box<dyn InferenceSession>,
        // Keeps the runtime environment alive for as long as the session.
        _runtime: Arc<dyn InferenceRuntime>,
    },
    Closed,
}

impl InvokerState {
    fn kind(&self) -> EngineState {
        match self {
            InvokerState::Uninitialized { .. } => EngineState::Uninitialized,
            InvokerState::Initialized { .. } => EngineState::Initialized,
            InvokerState::Closed => EngineState::Closed,
        }
    }
}

/// Owns the engine session and enforces `Uninitialized -> Initialized -> Closed`.
///
/// All forward passes go through one lock, so concurrent callers are
/// serialized and `close` never races a running pass.
pub struct InferenceInvoker {
    state: Mutex<InvokerState>,
    bindings: TensorBindings,
    vocab_size: usize,
}

impl std::fmt::Debug for InferenceInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceInvoker")
            .field("state", &self.state())
            .field("bindings", &self.bindings)
            .field("vocab_size", &self.vocab_size)
            .finish()
    }
}

impl InferenceInvoker {
    /// Create an uninitialized invoker. No session is opened yet.
    pub fn new(
        runtime: Arc<dyn InferenceRuntime>,
        model_graph: Vec<u8>,
        bindings: TensorBindings,
        vocab_size: usize,
    ) -> Self {
        Self {
            state: Mutex::new(InvokerState::Uninitialized {
                runtime,
                model_graph,
            }),
            bindings,
            vocab_size,
        }
    }

    fn lock(&self) -> EmbeddingResult<MutexGuard<'_, InvokerState>> {
        self.state.lock().map_err(|_| EmbeddingError::InternalError {
            message: "inference invoker lock poisoned".to_string(),
        })
    }

    /// Current lifecycle state. A poisoned lock reports `Closed`.
    pub fn state(&self) -> EngineState {
        self.lock()
            .map(|guard| guard.kind())
            .unwrap_or(EngineState::Closed)
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Open the session. Calling this on an initialized invoker is a no-op.
    ///
    /// # Errors
    /// - `EmbeddingError::InvalidState` if the invoker is closed
    /// - `EmbeddingError::EngineInitError` if the session cannot be created;
    ///   the invoker stays uninitialized
    pub fn initialize(&self) -> EmbeddingResult<()> {
        let mut guard = self.lock()?;
        let (session, runtime) = match &*guard {
            InvokerState::Initialized { .. } => return Ok(()),
            InvokerState::Closed => {
                return Err(EmbeddingError::InvalidState {
                    operation: "initialize",
                    state: EngineState::Closed,
                })
            }
            InvokerState::Uninitialized {
                runtime,
                model_graph,
            } => {
                let session = runtime.create_session(model_graph, &self.bindings)?;
                (session, Arc::clone(runtime))
            }
        };

        tracing::debug!(
            runtime = runtime.name(),
            output = %self.bindings.output,
            "Inference session created"
        );
        *guard = InvokerState::Initialized {
            session,
            _runtime: runtime,
        };
        Ok(())
    }

    /// Run one forward pass and check the output shape.
    ///
    /// # Errors
    /// - `EmbeddingError::InvalidState` unless initialized
    /// - `EmbeddingError::InferenceError` if the engine faults
    /// - `EmbeddingError::ShapeMismatch` if the output is not `[batch, vocab]`
    pub fn run(&self, batch: &PaddedBatch) -> EmbeddingResult<OutputTensor> {
        let mut guard = self.lock()?;
        let session = match &mut *guard {
            InvokerState::Initialized { session, .. } => session,
            other => {
                return Err(EmbeddingError::InvalidState {
                    operation: "run inference",
                    state: other.kind(),
                })
            }
        };

        let [batch_size, seq_len] = batch.shape();
        tracing::debug!(batch_size, seq_len, "Running forward pass");

        let data = session.run(batch)?;
        OutputTensor::from_flat(data, batch_size, self.vocab_size)
    }

    /// Release the session. Idempotent; once closed the invoker stays closed.
    pub fn close(&self) -> EmbeddingResult<()> {
        let mut guard = self.lock()?;
        if matches!(*guard, InvokerState::Closed) {
            return Ok(());
        }
        *guard = InvokerState::Closed;
        tracing::debug!("Inference session released");
        Ok(())
    }
}
