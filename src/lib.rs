/// This crate is a course recommender built on a TF-IDF vectorizer.
pub mod config;
pub mod error;
pub mod recommend;
pub mod text;
pub mod utils;
pub mod vectorizer;

/// Recommender Context
/// The top-level struct of this crate. It pairs everything a request needs:
/// - The text normalizer (segmenter + stopwords)
/// - The fitted vocabulary
/// - The course catalog
/// - The corpus matrix, one row per catalog entry
///
/// The context is validated once when it is built and is read-only afterwards.
/// It is `Send + Sync` and can be shared between threads behind a reference.
///
/// `RecommenderContext<E>` is generic over the TF-IDF engine `E`
/// (default `DefaultTfIdfEngine`).
pub use recommend::RecommenderContext;

/// Candidate selection for a request
/// - `Catalog`: the main catalog only
/// - `ColdStart`: only the supplied metadata rows
/// - `Merged`: both, in one ranked list
pub use recommend::Candidates;

/// Offline build of a `ModelBundle` from a catalog and a stopword set
pub use recommend::build_model;

/// Catalog rows and the catalog table
/// Rows without review text are matched on their course and teacher names.
pub use recommend::catalog::{Catalog, CatalogEntry, EntryKind};

/// Cold start scoring
pub use recommend::cold_start::score_cold_start;

/// Vocabulary
/// Ordered term set with one IDF weight per term.
/// Fitted once on the normalized review texts, then used for every transform.
///
/// # Serialization
/// Supported.
pub use vectorizer::Vocabulary;

/// Corpus Matrix
/// One TF-IDF vector per catalog row, in catalog order.
pub use vectorizer::corpus::CorpusMatrix;

/// Model Bundle
/// Persisted output of the offline build: stopwords, vocabulary and corpus matrix.
///
/// # Serialization
/// Supported (CBOR).
pub use vectorizer::serde::ModelBundle;

/// Term Frequency structure
/// Counts term occurrences within one normalized document.
/// Used as base data for TF calculation.
pub use vectorizer::term::TermFrequency;

/// TF IDF Calculation Engine Trait
/// Plug different TF / IDF formulas into `Vocabulary<E>`.
/// `DefaultTfIdfEngine` uses raw counts, smoothed IDF and L2 normalization.
pub use vectorizer::tfidf::{DefaultTfIdfEngine, SublinearTfIdfEngine, TfIdfEngine};

/// Scoring and ranking
/// - `Hits`: scored rows, sortable by composite score
/// - `Recommendation`: one entry of the final list
pub use vectorizer::evaluate::scoring::{blend, score, Hits, Recommendation, RowOrigin, ScoredRow};

/// Cosine similarity, one-vs-one and one-vs-many
pub use vectorizer::evaluate::similarity::{cosine, similarity};

/// Text normalization
pub use text::{segmenter::JiebaSegmenter, segmenter::Segmenter, stopwords::StopwordSet, TextNormalizer};

/// Sparse vector used for every TF-IDF vector
pub use utils::math::vector::ZeroSpVec;

pub use config::{RatingScale, RecommenderConfig, ScoringConfig, VectorizerConfig};
pub use error::{RecommendError, RecommendResult};
