use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RecommendError, RecommendResult};
use crate::utils::math::vector::ZeroSpVec;
use crate::vectorizer::{tfidf::TfIdfEngine, Vocabulary};

/// Corpus matrix: one weighted term vector per catalog row.
///
/// Row `i` belongs to the catalog entry at index `i`; `row_ids` records the
/// entry identifiers at build time so the alignment can be checked whenever the
/// matrix is paired with a freshly loaded catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusMatrix {
    dim: usize,
    row_ids: Vec<String>,
    rows: Vec<ZeroSpVec<f64>>,
}

impl CorpusMatrix {
    /// Vectorize normalized documents against `vocab`.
    /// `ids` and `docs` must have the same length.
    pub fn build<E, S, I>(vocab: &Vocabulary<E>, ids: &[I], docs: &[S]) -> RecommendResult<Self>
    where
        E: TfIdfEngine + Sync,
        S: AsRef<str> + Sync,
        I: AsRef<str>,
    {
        if ids.len() != docs.len() {
            return Err(RecommendError::resource(format!(
                "{} row ids for {} documents",
                ids.len(),
                docs.len()
            )));
        }
        let rows = vocab.transform_batch(docs);
        let empty_rows = rows.par_iter().filter(|r| r.is_zero()).count();
        info!(rows = rows.len(), dim = vocab.len(), empty_rows, "built corpus matrix");
        Ok(Self {
            dim: vocab.len(),
            row_ids: ids.iter().map(|id| id.as_ref().to_string()).collect(),
            rows,
        })
    }

    /// Assemble from precomputed rows
    pub fn from_rows(dim: usize, row_ids: Vec<String>, rows: Vec<ZeroSpVec<f64>>) -> RecommendResult<Self> {
        let matrix = Self { dim, row_ids, rows };
        matrix.validate()?;
        Ok(matrix)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// column count (vocabulary size at build time)
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&ZeroSpVec<f64>> {
        self.rows.get(index)
    }

    #[inline]
    pub fn rows(&self) -> &[ZeroSpVec<f64>] {
        &self.rows
    }

    #[inline]
    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    /// Internal consistency: ids per row, every row of width `dim`
    pub fn validate(&self) -> RecommendResult<()> {
        if self.row_ids.len() != self.rows.len() {
            return Err(RecommendError::resource(format!(
                "corpus matrix has {} rows but {} row ids",
                self.rows.len(),
                self.row_ids.len()
            )));
        }
        if let Some(pos) = self.rows.iter().position(|r| r.len() != self.dim) {
            return Err(RecommendError::resource(format!(
                "corpus matrix row {pos} has width {}, expected {}",
                self.rows[pos].len(),
                self.dim
            )));
        }
        Ok(())
    }
}
