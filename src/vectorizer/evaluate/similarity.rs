use rayon::prelude::*;
use tracing::debug;

use crate::utils::math::vector::ZeroSpVec;
use crate::vectorizer::corpus::CorpusMatrix;

/// One-vs-one cosine similarity in [0, 1].
/// 0.0 when either side has zero norm.
#[inline]
pub fn cosine(a: &ZeroSpVec<f64>, b: &ZeroSpVec<f64>) -> f64 {
    a.cosine(b).max(0.0)
}

/// One-vs-many cosine similarity, aligned by row with `matrix`
pub fn similarity(query: &ZeroSpVec<f64>, matrix: &CorpusMatrix) -> Vec<f64> {
    similarity_rows(query, matrix.rows())
}

/// One-vs-many over a plain slice of rows
pub fn similarity_rows(query: &ZeroSpVec<f64>, rows: &[ZeroSpVec<f64>]) -> Vec<f64> {
    if query.is_zero() {
        debug!(rows = rows.len(), "zero query vector, all similarities are 0");
        return vec![0.0; rows.len()];
    }
    rows.par_iter().map(|row| cosine(query, row)).collect()
}
