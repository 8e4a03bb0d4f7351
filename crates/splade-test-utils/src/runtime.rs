//! Deterministic inference runtimes.
//!
//! `BagOfWordsRuntime` stands in for the SPLADE graph: each output row holds
//! `ln(1 + count)` at every attended, non-special token id. Rows are
//! non-negative and mostly zero, like real SPLADE output, and two texts
//! sharing a word get a positive dot product.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use splade_embeddings::{
    EmbeddingError, EmbeddingResult, InferenceRuntime, InferenceSession, PaddedBatch,
    TensorBindings,
};

use crate::tokenizer::SPECIAL_IDS;

/// Counts and shapes of forward passes, shared with the test.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    runs: Arc<AtomicUsize>,
    shapes: Arc<Mutex<Vec<[usize; 2]>>>,
    sessions: Arc<AtomicUsize>,
}

impl CallLog {
    /// Forward passes executed.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Sessions opened.
    pub fn sessions(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    /// `[batch, seq_len]` of each pass, in order.
    pub fn shapes(&self) -> Vec<[usize; 2]> {
        self.shapes.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, batch: &PaddedBatch) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut shapes) = self.shapes.lock() {
            shapes.push(batch.shape());
        }
    }
}

fn bag_of_words(batch: &PaddedBatch, width: usize) -> EmbeddingResult<Vec<f32>> {
    let [batch_size, _] = batch.shape();
    let mut out = vec![0.0f32; batch_size * width];

    for b in 0..batch_size {
        let (Some(ids), Some(mask)) = (batch.input_ids().row(b), batch.attention_mask().row(b))
        else {
            continue;
        };
        let row = &mut out[b * width..(b + 1) * width];
        let mut counts = vec![0u32; width];

        for (&id, &m) in ids.iter().zip(mask) {
            if m == 0 || SPECIAL_IDS.iter().any(|&s| i64::from(s) == id) {
                continue;
            }
            let slot = usize::try_from(id)
                .ok()
                .filter(|&i| i < width)
                .ok_or_else(|| EmbeddingError::InferenceError {
                    message: format!("token id {} outside vocabulary of {}", id, width),
                })?;
            counts[slot] += 1;
        }
        for (dst, &c) in row.iter_mut().zip(&counts) {
            if c > 0 {
                *dst = (1.0 + c as f32).ln();
            }
        }
    }
    Ok(out)
}

/// Runtime whose sessions compute [`bag_of_words`] rows of `width`.
#[derive(Debug, Clone)]
pub struct BagOfWordsRuntime {
    width: usize,
    log: CallLog,
}

impl BagOfWordsRuntime {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            log: CallLog::default(),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

struct BagOfWordsSession {
    width: usize,
    log: CallLog,
}

impl InferenceSession for BagOfWordsSession {
    fn run(&mut self, batch: &PaddedBatch) -> EmbeddingResult<Vec<f32>> {
        self.log.record(batch);
        bag_of_words(batch, self.width)
    }
}

impl InferenceRuntime for BagOfWordsRuntime {
    fn name(&self) -> &str {
        "bag-of-words"
    }

    fn create_session(
        &self,
        _model_graph: &[u8],
        _bindings: &TensorBindings,
    ) -> EmbeddingResult<Box<dyn InferenceSession>> {
        self.log.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(BagOfWordsSession {
            width: self.width,
            log: self.log.clone(),
        }))
    }
}

/// Failure mode for [`FaultyRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `create_session` fails.
    Init,
    /// Passes after the first `n` fail with `InferenceError`.
    RunAfter(usize),
    /// Rows come back with this width instead of the configured one.
    Width(usize),
}

/// Bag-of-words runtime with an injected fault.
#[derive(Debug, Clone)]
pub struct FaultyRuntime {
    width: usize,
    fault: Fault,
    log: CallLog,
}

impl FaultyRuntime {
    pub fn new(width: usize, fault: Fault) -> Self {
        Self {
            width,
            fault,
            log: CallLog::default(),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

struct FaultySession {
    width: usize,
    fault: Fault,
    log: CallLog,
}

impl InferenceSession for FaultySession {
    fn run(&mut self, batch: &PaddedBatch) -> EmbeddingResult<Vec<f32>> {
        let completed = self.log.runs();
        self.log.record(batch);
        match self.fault {
            Fault::RunAfter(n) if completed >= n => Err(EmbeddingError::InferenceError {
                message: format!("injected fault on pass {}", completed + 1),
            }),
            Fault::Width(w) => bag_of_words(batch, w),
            _ => bag_of_words(batch, self.width),
        }
    }
}

impl InferenceRuntime for FaultyRuntime {
    fn name(&self) -> &str {
        "faulty"
    }

    fn create_session(
        &self,
        _model_graph: &[u8],
        _bindings: &TensorBindings,
    ) -> EmbeddingResult<Box<dyn InferenceSession>> {
        if self.fault == Fault::Init {
            return Err(EmbeddingError::EngineInitError {
                message: "injected init fault".to_string(),
            });
        }
        self.log.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FaultySession {
            width: self.width,
            fault: self.fault,
            log: self.log.clone(),
        }))
    }
}
