pub mod corpus;
pub mod evaluate;
pub mod serde;
pub mod term;
pub mod tfidf;

use std::collections::{BTreeMap, HashSet};
use std::marker::PhantomData;

use ::serde::{Deserialize, Serialize};
use indexmap::IndexSet;
use rayon::prelude::*;
use tracing::info;

use crate::config::VectorizerConfig;
use crate::error::{RecommendError, RecommendResult};
use crate::utils::math::vector::ZeroSpVec;
use crate::vectorizer::{
    term::TermFrequency,
    tfidf::{DefaultTfIdfEngine, TfIdfEngine},
};

/// Fitted term vocabulary.
///
/// Holds the ordered term set (term index = vector dimension), the IDF weight of
/// each term and the analysis settings used at fit time. Fitted once offline,
/// then shared read-only by corpus vectors and query vectors.
///
/// `Vocabulary<E>` is generic over the TF-IDF engine `E`; the engine is part of
/// the type so a vocabulary cannot be transformed with a different formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary<E = DefaultTfIdfEngine>
where
    E: TfIdfEngine,
{
    /// terms in lexicographic order
    terms: IndexSet<String>,
    /// idf weight per term, aligned with `terms`
    idf: Vec<f64>,
    /// number of documents in the fit corpus
    doc_num: u64,
    config: VectorizerConfig,
    /// `TfIdfEngine::NAME` of the engine used at fit time
    engine: String,
    #[serde(skip)]
    _marker: PhantomData<E>,
}

impl<E> Vocabulary<E>
where
    E: TfIdfEngine,
{
    /// Fit a vocabulary on normalized documents.
    /// Document frequency counts each term once per document.
    pub fn fit<S>(corpus: &[S], config: VectorizerConfig) -> Self
    where
        S: AsRef<str> + Sync,
    {
        let min_chars = config.min_term_chars;
        let doc_terms: Vec<HashSet<&str>> = corpus
            .par_iter()
            .map(|doc| {
                doc.as_ref()
                    .split_whitespace()
                    .filter(|t| t.chars().count() >= min_chars)
                    .collect()
            })
            .collect();

        let mut doc_freq: BTreeMap<&str, u64> = BTreeMap::new();
        for terms in &doc_terms {
            for term in terms {
                *doc_freq.entry(*term).or_insert(0) += 1;
            }
        }

        let doc_num = corpus.len() as u64;
        let mut terms = IndexSet::with_capacity(doc_freq.len());
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (term, df) in doc_freq {
            terms.insert(term.to_string());
            idf.push(E::idf(doc_num, df));
        }
        info!(docs = doc_num, terms = terms.len(), "fitted vocabulary");

        Self {
            terms,
            idf,
            doc_num,
            config,
            engine: E::NAME.to_string(),
            _marker: PhantomData,
        }
    }

    /// Vectorize one normalized string.
    /// Terms outside the vocabulary contribute nothing.
    pub fn transform(&self, text: &str) -> ZeroSpVec<f64> {
        let freq = TermFrequency::from_normalized(text, self.config.min_term_chars);
        self.transform_freq(&freq)
    }

    /// Vectorize an already counted document
    pub fn transform_freq(&self, freq: &TermFrequency) -> ZeroSpVec<f64> {
        let term_sum = freq.term_sum();
        let pairs: Vec<(u32, f64)> = freq
            .iter()
            .filter_map(|(term, count)| {
                let idx = self.terms.get_index_of(term)?;
                Some((idx as u32, E::tf(count, term_sum) * self.idf[idx]))
            })
            .collect();
        let mut vec = ZeroSpVec::from_pairs(self.terms.len(), pairs);
        E::finish(&mut vec);
        vec
    }

    /// Vectorize many normalized strings, output aligned with input
    pub fn transform_batch<S>(&self, texts: &[S]) -> Vec<ZeroSpVec<f64>>
    where
        S: AsRef<str> + Sync,
        E: Sync,
    {
        texts.par_iter().map(|t| self.transform(t.as_ref())).collect()
    }

    /// Vector dimension
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }

    #[inline]
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// idf of `term`, `None` if unknown
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.terms.get_index_of(term).map(|idx| self.idf[idx])
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Structural checks for a vocabulary that came from storage
    pub fn validate(&self) -> RecommendResult<()> {
        if self.engine != E::NAME {
            return Err(RecommendError::resource(format!(
                "vocabulary was fitted with the `{}` engine but is loaded as `{}`",
                self.engine,
                E::NAME
            )));
        }
        if self.idf.len() != self.terms.len() {
            return Err(RecommendError::resource(format!(
                "vocabulary has {} terms but {} idf weights",
                self.terms.len(),
                self.idf.len()
            )));
        }
        if let Some(pos) = self.idf.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(RecommendError::resource(format!(
                "vocabulary idf weight for `{}` is not a finite non-negative number",
                self.terms.get_index(pos).map(String::as_str).unwrap_or("?")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::tfidf::SublinearTfIdfEngine;

    fn corpus() -> Vec<&'static str> {
        vec![
            "students clear explanations patient",
            "difficult heavy workload stressful",
            "clear slides heavy workload",
        ]
    }

    #[test]
    fn fit_orders_terms_and_weights_rare_terms_higher() {
        let vocab: Vocabulary = Vocabulary::fit(&corpus(), VectorizerConfig::default());
        let terms: Vec<&str> = vocab.terms().collect();
        let mut sorted = terms.clone();
        sorted.sort();
        assert_eq!(terms, sorted);
        assert_eq!(vocab.len(), 9);
        assert_eq!(vocab.doc_num(), 3);
        assert!(vocab.idf("patient").unwrap() > vocab.idf("clear").unwrap());
        assert!(vocab.validate().is_ok());
    }

    #[test]
    fn transform_ignores_unknown_terms() {
        let vocab: Vocabulary = Vocabulary::fit(&corpus(), VectorizerConfig::default());
        let v = vocab.transform("quantum chromodynamics");
        assert!(v.is_zero());
        assert_eq!(v.len(), vocab.len());
        assert_eq!(vocab.len(), 9);

        let v = vocab.transform("clear quantum");
        assert_eq!(v.nnz(), 1);
        assert!((v.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn transform_is_deterministic() {
        let vocab: Vocabulary = Vocabulary::fit(&corpus(), VectorizerConfig::default());
        let a = vocab.transform("heavy clear workload clear");
        let b = vocab.transform("heavy clear workload clear");
        let bits = |v: &ZeroSpVec<f64>| v.raw_iter().map(|(i, x)| (i, x.to_bits())).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn min_term_chars_applies_at_fit_and_transform() {
        let vocab: Vocabulary = Vocabulary::fit(&["a bb ccc"], VectorizerConfig { min_term_chars: 2 });
        assert!(!vocab.contains_term("a"));
        assert!(vocab.contains_term("bb"));
        assert_eq!(vocab.transform("a").nnz(), 0);

        let vocab: Vocabulary = Vocabulary::fit(&["a bb ccc"], VectorizerConfig { min_term_chars: 1 });
        assert!(vocab.contains_term("a"));
    }

    #[test]
    fn empty_corpus_gives_empty_vocabulary() {
        let empty: Vec<String> = Vec::new();
        let vocab: Vocabulary = Vocabulary::fit(&empty, VectorizerConfig::default());
        assert!(vocab.is_empty());
        assert!(vocab.transform("anything at all").is_zero());
    }

    #[test]
    fn batch_matches_single_transform() {
        let vocab: Vocabulary = Vocabulary::fit(&corpus(), VectorizerConfig::default());
        let batch = vocab.transform_batch(&corpus());
        for (doc, vec) in corpus().iter().zip(batch.iter()) {
            assert_eq!(&vocab.transform(doc), vec);
        }
    }

    #[test]
    fn engine_changes_weights() {
        let default: Vocabulary = Vocabulary::fit(&corpus(), VectorizerConfig::default());
        let sublinear: Vocabulary<SublinearTfIdfEngine> = Vocabulary::fit(&corpus(), VectorizerConfig::default());
        let text = "clear clear clear patient";
        let d = default.transform(text);
        let s = sublinear.transform(text);
        // repeated term dominates less under sublinear tf
        let clear = default.terms().position(|t| t == "clear").unwrap();
        assert!(s.get(clear).unwrap() < d.get(clear).unwrap());
    }
}
