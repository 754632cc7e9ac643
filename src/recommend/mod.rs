pub mod catalog;
pub mod cold_start;

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{ScoringConfig, VectorizerConfig};
use crate::error::{RecommendError, RecommendResult};
use crate::recommend::catalog::{Catalog, CatalogEntry, EntryKind};
use crate::recommend::cold_start::{score_cold_start, score_metadata};
use crate::text::{segmenter::Segmenter, stopwords::StopwordSet, TextNormalizer};
use crate::utils::math::vector::ZeroSpVec;
use crate::vectorizer::{
    corpus::CorpusMatrix,
    evaluate::{
        scoring::{normalize_rating, Hits, Recommendation, RowOrigin, ScoredRow},
        similarity::similarity,
    },
    serde::ModelBundle,
    tfidf::{DefaultTfIdfEngine, TfIdfEngine},
    Vocabulary,
};

/// Which rows a request ranks
#[derive(Debug, Clone, Copy)]
pub enum Candidates<'a> {
    /// catalog rows only, every row scored through the corpus matrix
    Catalog,
    /// the given metadata-only rows only
    ColdStart(&'a [CatalogEntry]),
    /// catalog rows plus the given rows, one ranked list.
    /// Catalog rows without reviews are scored on their metadata.
    Merged(&'a [CatalogEntry]),
}

/// Offline build: normalize every review text, fit the vocabulary and vectorize
/// the catalog. Rows without reviews get an empty document (zero vector).
pub fn build_model<E>(
    catalog: &Catalog,
    stopwords: StopwordSet,
    segmenter: Arc<dyn Segmenter>,
    config: VectorizerConfig,
) -> RecommendResult<ModelBundle<E>>
where
    E: TfIdfEngine + Sync,
{
    let normalizer = TextNormalizer::new(segmenter, Arc::new(stopwords.clone()));
    let docs: Vec<String> = catalog
        .entries()
        .par_iter()
        .map(|entry| normalizer.normalize(entry.review_text()))
        .collect();
    let vocabulary = Vocabulary::<E>::fit(&docs, config);
    let matrix = CorpusMatrix::build(&vocabulary, &catalog.ids(), &docs)?;
    let bundle = ModelBundle::new(stopwords, vocabulary, matrix);
    bundle.validate()?;
    Ok(bundle)
}

/// Everything a request needs, loaded once and shared read-only.
///
/// The context owns the single fitted vocabulary; the main path and the cold-start
/// path both borrow it, so they can never score against different vocabularies.
#[derive(Debug, Clone)]
pub struct RecommenderContext<E = DefaultTfIdfEngine>
where
    E: TfIdfEngine,
{
    normalizer: TextNormalizer,
    vocabulary: Arc<Vocabulary<E>>,
    catalog: Arc<Catalog>,
    matrix: Arc<CorpusMatrix>,
}

impl<E> RecommenderContext<E>
where
    E: TfIdfEngine + Sync,
{
    /// Pair the resources and check that they line up:
    /// one matrix row per catalog row, same ids in the same order, widths equal to
    /// the vocabulary size.
    pub fn new(
        normalizer: TextNormalizer,
        vocabulary: Arc<Vocabulary<E>>,
        catalog: Arc<Catalog>,
        matrix: Arc<CorpusMatrix>,
    ) -> RecommendResult<Self> {
        vocabulary.validate()?;
        matrix.validate()?;
        if matrix.dim() != vocabulary.len() {
            return Err(RecommendError::resource(format!(
                "corpus matrix width {} does not match vocabulary size {}",
                matrix.dim(),
                vocabulary.len()
            )));
        }
        if matrix.len() != catalog.len() {
            return Err(RecommendError::resource(format!(
                "corpus matrix has {} rows but the catalog has {}",
                matrix.len(),
                catalog.len()
            )));
        }
        if let Some(pos) = catalog
            .iter()
            .zip(matrix.row_ids())
            .position(|(entry, id)| entry.course_id != *id)
        {
            return Err(RecommendError::resource(format!(
                "catalog row {pos} has id {:?} but the matrix row was built for {:?}",
                catalog.entries()[pos].course_id,
                matrix.row_ids()[pos]
            )));
        }
        info!(
            rows = catalog.len(),
            terms = vocabulary.len(),
            stopwords = normalizer.stopwords().len(),
            "recommender context ready"
        );
        Ok(Self {
            normalizer,
            vocabulary,
            catalog,
            matrix,
        })
    }

    /// Build a context from a loaded bundle, using the bundle's own stopwords
    pub fn from_bundle(
        bundle: ModelBundle<E>,
        catalog: Catalog,
        segmenter: Arc<dyn Segmenter>,
    ) -> RecommendResult<Self> {
        bundle.validate()?;
        let normalizer = TextNormalizer::new(segmenter, Arc::new(bundle.stopwords));
        Self::new(
            normalizer,
            Arc::new(bundle.vocabulary),
            Arc::new(catalog),
            Arc::new(bundle.matrix),
        )
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn vocabulary(&self) -> &Vocabulary<E> {
        &self.vocabulary
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &CorpusMatrix {
        &self.matrix
    }

    /// Normalize and vectorize a raw query.
    /// An empty or fully filtered query gives the zero vector.
    pub fn query_vector(&self, query: &str) -> ZeroSpVec<f64> {
        let normalized = self.normalizer.normalize(query);
        if normalized.is_empty() {
            debug!("query is empty after normalization");
        }
        let vector = self.vocabulary.transform(&normalized);
        debug!(
            tokens = normalized.split(' ').filter(|t| !t.is_empty()).count(),
            known_terms = vector.nnz(),
            "query vectorized"
        );
        vector
    }

    /// Every catalog row scored through the corpus matrix, in catalog order.
    /// Rows without reviews keep their rating; their similarity is 0.
    pub fn score_catalog(&self, query: &ZeroSpVec<f64>, config: &ScoringConfig) -> Vec<ScoredRow> {
        let sims = similarity(query, &self.matrix);
        self.catalog
            .iter()
            .zip(sims)
            .enumerate()
            .map(|(i, (entry, sim))| {
                ScoredRow::new(
                    &entry.course_name,
                    &entry.teacher_name,
                    RowOrigin::Catalog(i),
                    sim,
                    normalize_rating(entry.avg_rating, config.rating_scale),
                    config,
                )
            })
            .collect()
    }

    /// Catalog rows in catalog order; rows without reviews go through the metadata path
    fn score_catalog_mixed(&self, query: &ZeroSpVec<f64>, config: &ScoringConfig) -> Vec<ScoredRow> {
        let mut rows = self.score_catalog(query, config);
        for (i, entry) in self.catalog.iter().enumerate() {
            if entry.kind() == EntryKind::MetadataOnly {
                rows[i] = score_metadata(
                    query,
                    entry,
                    RowOrigin::Catalog(i),
                    &self.vocabulary,
                    &self.normalizer,
                    config,
                );
            }
        }
        rows
    }

    /// Rank the main catalog
    pub fn recommend(&self, query: &str, config: &ScoringConfig) -> RecommendResult<Vec<Recommendation>> {
        self.recommend_candidates(query, Candidates::Catalog, config)
    }

    /// Rank only the given rows on their metadata
    pub fn recommend_cold_start(
        &self,
        query: &str,
        new_entries: &[CatalogEntry],
        config: &ScoringConfig,
    ) -> RecommendResult<Vec<Recommendation>> {
        self.recommend_candidates(query, Candidates::ColdStart(new_entries), config)
    }

    /// Rank the catalog and the given rows together.
    /// Ties keep catalog rows ahead of new rows.
    pub fn recommend_merged(
        &self,
        query: &str,
        new_entries: &[CatalogEntry],
        config: &ScoringConfig,
    ) -> RecommendResult<Vec<Recommendation>> {
        self.recommend_candidates(query, Candidates::Merged(new_entries), config)
    }

    pub fn recommend_candidates(
        &self,
        query: &str,
        candidates: Candidates<'_>,
        config: &ScoringConfig,
    ) -> RecommendResult<Vec<Recommendation>> {
        config.validate()?;
        let query_vec = self.query_vector(query);
        let hits = match candidates {
            Candidates::Catalog => Hits::new(self.score_catalog(&query_vec, config)),
            Candidates::ColdStart(entries) => Hits::new(score_cold_start(
                &query_vec,
                entries,
                &self.vocabulary,
                &self.normalizer,
                config,
            )),
            Candidates::Merged(entries) => {
                let mut hits = Hits::new(self.score_catalog_mixed(&query_vec, config));
                hits.extend(score_cold_start(
                    &query_vec,
                    entries,
                    &self.vocabulary,
                    &self.normalizer,
                    config,
                ));
                hits
            }
        };
        let scored = hits.len();
        let ranked = hits.into_ranked(config);
        info!(scored, returned = ranked.len(), "ranked recommendations");
        Ok(ranked)
    }
}
