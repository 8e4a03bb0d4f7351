//! Encode one query against three documents and print the scores.
//!
//! ```text
//! ONNXRUNTIME_LIB_PATH=/opt/onnxruntime/lib/libonnxruntime.so \
//! SPLADE_MODELS_DIR=./models/splade \
//!     cargo run -p splade-embeddings --example encode
//! ```

use splade_embeddings::{EmbeddingResult, SpladeModel};

fn main() -> EmbeddingResult<()> {
    let model = SpladeModel::new()?;

    let queries = ["what causes aging fast"];
    let documents = [
        "UV-A light is what mainly causes tanning, skin aging, and cataracts.",
        "Alzheimer's disease usually worsens slowly, depending on age at diagnosis.",
        "Bell's palsy and extreme tiredness and liver pain (2 causes)",
    ];

    let query_embeddings = model.encode_query(&queries)?;
    let document_embeddings = model.encode_document(&documents)?;

    println!(
        "Query embeddings shape: [{}, {}]",
        query_embeddings.len(),
        model.vocab_size()
    );
    println!(
        "Document embeddings shape: [{}, {}]",
        document_embeddings.len(),
        model.vocab_size()
    );

    let scores = model.similarity(&query_embeddings, &document_embeddings)?;
    println!("Similarities: {:?}", scores);

    for (term, weight) in model.top_terms(&query_embeddings[0], 8) {
        println!("  {:>12} {:.3}", term, weight);
    }

    model.close()
}
