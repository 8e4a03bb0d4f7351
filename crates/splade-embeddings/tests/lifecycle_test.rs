//! Model construction and close semantics.

use std::sync::Arc;

use splade_embeddings::{
    EmbeddingError, EngineState, ModelAssets, PipelineStage, SpladeConfig, SpladeModel,
    TokenEncoding,
};
use splade_test_utils::{
    fixture_assets, fixture_config, fixture_model, fixture_model_with, BagOfWordsRuntime, Fault,
    FaultyRuntime, FIXTURE_VOCAB_SIZE,
};

#[test]
fn test_built_model_is_initialized() {
    let (model, log) = fixture_model().expect("fixture model");
    assert_eq!(model.state(), EngineState::Initialized);
    assert_eq!(model.vocab_size(), FIXTURE_VOCAB_SIZE);
    assert_eq!(log.sessions(), 1);
    assert_eq!(log.runs(), 0, "building runs no forward pass");
}

#[test]
fn test_double_close_is_noop() {
    let (model, _) = fixture_model().expect("fixture model");
    model.close().expect("close");
    model.close().expect("second close");
    assert!(model.is_closed());
}

#[test]
fn test_encode_after_close_is_invalid_state() {
    let (model, log) = fixture_model().expect("fixture model");
    model.close().expect("close");

    let err = model
        .encode_query(&["How does aging affect memory?"])
        .expect_err("closed model");
    assert!(matches!(
        err,
        EmbeddingError::InvalidState {
            state: EngineState::Closed,
            ..
        }
    ));
    assert_eq!(err.stage(), PipelineStage::Lifecycle);

    let encoding = TokenEncoding::from_ids(vec![101, 102]);
    assert!(matches!(
        model.compute_from_encoding(&encoding),
        Err(EmbeddingError::InvalidState { .. })
    ));
    assert_eq!(log.runs(), 0);
}

#[test]
fn test_empty_batch_after_close_still_empty() {
    let (model, _) = fixture_model().expect("fixture model");
    model.close().expect("close");
    let empty: [&str; 0] = [];
    assert!(model.encode_document(&empty).expect("no engine call").is_empty());
}

#[test]
fn test_close_releases_runtime() {
    let runtime = Arc::new(BagOfWordsRuntime::new(FIXTURE_VOCAB_SIZE));
    let model = fixture_model_with(runtime.clone(), 32).expect("fixture model");
    assert_eq!(Arc::strong_count(&runtime), 2);

    model.close().expect("close");
    assert_eq!(Arc::strong_count(&runtime), 1);
}

#[test]
fn test_models_are_independent() {
    let (first, _) = fixture_model().expect("first");
    let (second, _) = fixture_model().expect("second");

    first.close().expect("close first");
    let out = second.encode_query(&["memory"]).expect("second still open");
    assert_eq!(out.len(), 1);
}

#[test]
fn test_shared_across_threads() {
    let (model, log) = fixture_model().expect("fixture model");
    let model = Arc::new(model);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = Arc::clone(&model);
            std::thread::spawn(move || model.encode_document(&["aging brain", "memory"]))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread").expect("encode"))
        .collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(log.runs(), 4);
}

// =============================================================================
// BUILD FAILURES
// =============================================================================

#[test]
fn test_init_fault_is_engine_init_error() {
    let runtime = FaultyRuntime::new(FIXTURE_VOCAB_SIZE, Fault::Init);
    let result = fixture_model_with(Arc::new(runtime), 32);
    assert!(matches!(result, Err(EmbeddingError::EngineInitError { .. })));
}

#[test]
fn test_invalid_config_rejected_before_loading() {
    let mut config = fixture_config(32);
    config.model.vocab_size = 0;

    let result = SpladeModel::builder()
        .config(config)
        .assets(fixture_assets())
        .runtime(Arc::new(BagOfWordsRuntime::new(FIXTURE_VOCAB_SIZE)))
        .build();
    assert!(matches!(result, Err(EmbeddingError::ConfigError { .. })));
}

#[test]
fn test_corrupt_tokenizer_is_tokenization_error() {
    let result = SpladeModel::builder()
        .config(fixture_config(32))
        .assets(ModelAssets::new(b"not json".to_vec(), Vec::new()))
        .runtime(Arc::new(BagOfWordsRuntime::new(FIXTURE_VOCAB_SIZE)))
        .build();
    assert!(matches!(
        result,
        Err(EmbeddingError::TokenizationError { .. })
    ));
}

#[test]
fn test_missing_models_dir_is_asset_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = SpladeModel::builder()
        .config(SpladeConfig::default())
        .models_dir(dir.path().join("absent").display().to_string())
        .runtime(Arc::new(BagOfWordsRuntime::new(FIXTURE_VOCAB_SIZE)))
        .build();
    assert!(matches!(result, Err(EmbeddingError::AssetLoadError { .. })));
}

#[test]
fn test_assets_loaded_from_models_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let assets = fixture_assets();
    std::fs::write(dir.path().join("tokenizer.json"), &assets.tokenizer).expect("write");
    std::fs::write(dir.path().join("splade_pooled.onnx"), &assets.model_graph).expect("write");

    let model = SpladeModel::builder()
        .config(fixture_config(32))
        .models_dir(dir.path().display().to_string())
        .runtime(Arc::new(BagOfWordsRuntime::new(FIXTURE_VOCAB_SIZE)))
        .build()
        .expect("build from dir");

    assert_eq!(model.manifest(), &assets.manifest());
    assert_eq!(model.encode_query(&["aging"]).expect("encode").len(), 1);
}

#[cfg(feature = "embedded-assets")]
#[test]
fn test_default_dir_uses_embedded_assets() {
    let model = SpladeModel::builder()
        .config(SpladeConfig::default())
        .runtime(Arc::new(BagOfWordsRuntime::new(
            splade_embeddings::SPLADE_VOCAB_SIZE,
        )))
        .build()
        .expect("build from embedded assets");

    assert_eq!(model.manifest(), &ModelAssets::embedded().manifest());
}

#[cfg(feature = "embedded-assets")]
#[test]
fn test_configured_dir_overrides_embedded_assets() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = SpladeModel::builder()
        .config(SpladeConfig::default())
        .models_dir(dir.path().join("absent").display().to_string())
        .runtime(Arc::new(BagOfWordsRuntime::new(FIXTURE_VOCAB_SIZE)))
        .build();
    assert!(matches!(result, Err(EmbeddingError::AssetLoadError { .. })));
}
