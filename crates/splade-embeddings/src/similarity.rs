//! Query/document scoring by sparse dot product.

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::types::SimilarityMatrix;

/// Dot product of two equal-length vectors.
///
/// # Errors
/// - `EmbeddingError::DimensionMismatch` if the lengths differ
pub fn dot_product(a: &[f32], b: &[f32]) -> EmbeddingResult<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Pairwise dot products: entry `(i, j)` scores query `i` against document `j`.
///
/// Every embedding must have the same length as the first query (or the first
/// document when there are no queries). Checked up front so a mismatch fails
/// before any scoring work.
///
/// # Errors
/// - `EmbeddingError::DimensionMismatch` on the first embedding of a different length
pub fn similarity<Q, D>(queries: &[Q], documents: &[D]) -> EmbeddingResult<SimilarityMatrix>
where
    Q: AsRef<[f32]>,
    D: AsRef<[f32]>,
{
    let width = queries
        .first()
        .map(|q| q.as_ref().len())
        .or_else(|| documents.first().map(|d| d.as_ref().len()));

    if let Some(width) = width {
        let lengths = queries
            .iter()
            .map(|q| q.as_ref().len())
            .chain(documents.iter().map(|d| d.as_ref().len()));
        for len in lengths {
            if len != width {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: width,
                    got: len,
                });
            }
        }
    }

    let mut matrix = Vec::with_capacity(queries.len());
    for query in queries {
        let query = query.as_ref();
        let row = documents
            .iter()
            .map(|doc| query.iter().zip(doc.as_ref()).map(|(q, d)| q * d).sum())
            .collect();
        matrix.push(row);
    }
    Ok(matrix)
}
