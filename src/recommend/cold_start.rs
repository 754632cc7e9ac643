use rayon::prelude::*;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::recommend::catalog::CatalogEntry;
use crate::text::TextNormalizer;
use crate::utils::math::vector::ZeroSpVec;
use crate::vectorizer::{
    evaluate::{
        scoring::{RowOrigin, ScoredRow},
        similarity::cosine,
    },
    tfidf::TfIdfEngine,
    Vocabulary,
};

/// Score rows that have no review history.
///
/// Each row is represented by its normalized `course_name teacher_name` text,
/// vectorized with `vocab` and compared one-vs-one with `query`.
/// The quality signal is fixed at 0 whatever rating the row carries.
/// Rows come back in input order, tagged [`RowOrigin::NewEntry`].
pub fn score_cold_start<E>(
    query: &ZeroSpVec<f64>,
    entries: &[CatalogEntry],
    vocab: &Vocabulary<E>,
    normalizer: &TextNormalizer,
    config: &ScoringConfig,
) -> Vec<ScoredRow>
where
    E: TfIdfEngine + Sync,
{
    entries
        .par_iter()
        .enumerate()
        .map(|(i, entry)| score_metadata(query, entry, RowOrigin::NewEntry(i), vocab, normalizer, config))
        .collect()
}

/// One-vs-one metadata scoring of a single row.
/// Also used for catalog rows that have no review text.
pub(crate) fn score_metadata<E>(
    query: &ZeroSpVec<f64>,
    entry: &CatalogEntry,
    origin: RowOrigin,
    vocab: &Vocabulary<E>,
    normalizer: &TextNormalizer,
    config: &ScoringConfig,
) -> ScoredRow
where
    E: TfIdfEngine,
{
    let text = normalizer.normalize_metadata(&entry.course_name, &entry.teacher_name);
    let vector = vocab.transform(&text);
    if vector.is_zero() {
        debug!(course = %entry.course_name, "metadata shares no terms with the vocabulary");
    }
    ScoredRow::new(
        &entry.course_name,
        &entry.teacher_name,
        origin,
        cosine(query, &vector),
        0.0,
        config,
    )
}
