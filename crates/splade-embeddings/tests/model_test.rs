//! End-to-end encoding through `SpladeModel` with the fixture tokenizer and
//! the bag-of-words runtime.

use std::sync::Arc;

use splade_embeddings::{EmbeddingError, SparseVector, TokenEncoding};
use splade_test_utils::{
    fixture_model, fixture_model_with, word_id, BagOfWordsRuntime, Fault, FaultyRuntime,
    FIXTURE_VOCAB_SIZE,
};

const QUERY: &str = "How does aging affect memory?";
const DOCS: [&str; 3] = [
    "Aging changes the brain.",
    "Sleep improves memory and the brain.",
    "The stock market rose today.",
];

// =============================================================================
// SHAPES AND SCORES
// =============================================================================

#[test]
fn test_query_and_documents_end_to_end() {
    let (model, _) = fixture_model().expect("fixture model");

    let queries = model.encode_query(&[QUERY]).expect("encode query");
    let docs = model.encode_document(&DOCS).expect("encode documents");

    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].len(), FIXTURE_VOCAB_SIZE);
    assert_eq!(docs.len(), 3);
    assert!(docs.iter().all(|d| d.len() == FIXTURE_VOCAB_SIZE));

    let scores = model.similarity(&queries, &docs).expect("similarity");
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].len(), 3);
    assert!(scores[0].iter().all(|&s| s >= 0.0));

    assert!(scores[0][0] > 0.0, "shares 'aging'");
    assert!(scores[0][1] > 0.0, "shares 'memory'");
    assert_eq!(scores[0][2], 0.0, "no shared terms");
    assert!(scores[0][0] > scores[0][2]);
}

#[test]
fn test_embeddings_are_non_negative_and_sparse() {
    let (model, _) = fixture_model().expect("fixture model");
    let embedding = model.compute(QUERY, true).expect("compute");

    assert!(embedding.iter().all(|&w| w >= 0.0));
    let sparse = SparseVector::from_dense(&embedding);
    // how, does, aging, affect, memory, ?
    assert_eq!(sparse.nnz(), 6);
    assert!(sparse.sparsity() > 0.99);
}

#[test]
fn test_queries_and_documents_are_symmetric() {
    let (model, _) = fixture_model().expect("fixture model");
    let q = model.encode_query(&DOCS).expect("as queries");
    let d = model.encode_document(&DOCS).expect("as documents");
    assert_eq!(q, d);
}

#[test]
fn test_encoding_is_deterministic() {
    let (model, _) = fixture_model().expect("fixture model");
    let first = model.encode_document(&DOCS).expect("first");
    let second = model.encode_document(&DOCS).expect("second");
    assert_eq!(first, second);
}

#[test]
fn test_batch_matches_individual_encoding() {
    let (model, _) = fixture_model().expect("fixture model");
    let batch = model.encode_document(&DOCS).expect("batch");

    for (i, text) in DOCS.iter().enumerate() {
        let single = model.compute(text, true).expect("single");
        assert_eq!(batch[i], single, "row {} differs from its single encoding", i);
    }
}

#[test]
fn test_top_terms_name_vocabulary_words() {
    let (model, _) = fixture_model().expect("fixture model");
    let embedding = model.compute("memory memory aging", true).expect("compute");

    let terms = model.top_terms(&embedding, 2);
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0].0, "memory");
    assert_eq!(terms[1].0, "aging");
    assert!(terms[0].1 > terms[1].1);
}

// =============================================================================
// ENGINE USAGE
// =============================================================================

#[test]
fn test_empty_batch_skips_engine() {
    let (model, log) = fixture_model().expect("fixture model");
    let empty: [&str; 0] = [];

    assert!(model.encode_query(&empty).expect("empty").is_empty());
    assert!(model.compute_batch_from_encodings(&[]).expect("empty").is_empty());
    assert_eq!(log.runs(), 0);
}

#[test]
fn test_one_pass_per_batch_padded_to_longest() {
    let (model, log) = fixture_model().expect("fixture model");
    model.encode_document(&DOCS).expect("encode");

    // "Sleep improves memory and the brain." = 7 tokens + [CLS] [SEP]
    assert_eq!(log.shapes(), vec![[3, 9]]);
}

#[test]
fn test_single_item_has_no_padding() {
    let (model, log) = fixture_model().expect("fixture model");
    model.encode_query(&[QUERY]).expect("encode");
    assert_eq!(log.shapes(), vec![[1, 8]]);
}

#[test]
fn test_large_input_split_by_max_batch_size() {
    let runtime = BagOfWordsRuntime::new(FIXTURE_VOCAB_SIZE);
    let log = runtime.log();
    let model = fixture_model_with(Arc::new(runtime), 2).expect("fixture model");

    let texts = ["aging", "memory", "brain", "age", "sleep"];
    let embeddings = model.encode_document(&texts).expect("encode");

    assert_eq!(embeddings.len(), 5);
    assert_eq!(log.runs(), 3);
    let batch_sizes: Vec<usize> = log.shapes().iter().map(|s| s[0]).collect();
    assert_eq!(batch_sizes, vec![2, 2, 1]);

    let id = word_id("sleep").expect("fixture word") as usize;
    assert!(embeddings[4][id] > 0.0, "order preserved across passes");
}

#[test]
fn test_compute_from_encoding_skips_tokenizer() {
    let (model, _) = fixture_model().expect("fixture model");
    let aging = word_id("aging").expect("fixture word");

    let encoding = TokenEncoding::from_ids(vec![101, aging, aging, 102]);
    let embedding = model.compute_from_encoding(&encoding).expect("compute");

    let expected = (1.0f32 + 2.0).ln();
    assert!((embedding[aging as usize] - expected).abs() < 1e-6);
    assert_eq!(embedding[101], 0.0, "special tokens carry no weight");
}

// =============================================================================
// FAILURES
// =============================================================================

#[test]
fn test_failing_chunk_fails_whole_call() {
    let runtime = FaultyRuntime::new(FIXTURE_VOCAB_SIZE, Fault::RunAfter(1));
    let log = runtime.log();
    let model = fixture_model_with(Arc::new(runtime), 2).expect("fixture model");

    let result = model.encode_document(&DOCS);
    assert!(matches!(result, Err(EmbeddingError::InferenceError { .. })));
    assert_eq!(log.runs(), 2, "first chunk ran, second failed");
}

#[test]
fn test_model_usable_after_failed_call() {
    let runtime = FaultyRuntime::new(FIXTURE_VOCAB_SIZE, Fault::RunAfter(1));
    let model = fixture_model_with(Arc::new(runtime), 32).expect("fixture model");

    model.encode_query(&[QUERY]).expect("first pass succeeds");
    assert!(model.encode_query(&[QUERY]).is_err());
    assert!(!model.is_closed());
}

#[test]
fn test_wrong_output_width_is_shape_mismatch() {
    let runtime = FaultyRuntime::new(FIXTURE_VOCAB_SIZE, Fault::Width(FIXTURE_VOCAB_SIZE + 1));
    let model = fixture_model_with(Arc::new(runtime), 32).expect("fixture model");

    match model.encode_document(&DOCS[..2]) {
        Err(EmbeddingError::ShapeMismatch { expected, actual }) => {
            assert_eq!(expected, 2 * FIXTURE_VOCAB_SIZE);
            assert_eq!(actual, 2 * (FIXTURE_VOCAB_SIZE + 1));
        }
        other => panic!("expected ShapeMismatch, got {:?}", other.map(|e| e.len())),
    }
}

#[test]
fn test_similarity_rejects_mixed_widths() {
    let (model, _) = fixture_model().expect("fixture model");
    let queries = vec![vec![1.0, 0.0, 2.0]];
    let docs = vec![vec![1.0, 0.0]];
    assert!(matches!(
        model.similarity(&queries, &docs),
        Err(EmbeddingError::DimensionMismatch { expected: 3, got: 2 })
    ));
}
