use crate::utils::math::vector::ZeroSpVec;

/// TF-IDF calculation engine.
///
/// The same engine must be used for fitting a vocabulary and for every
/// transform against it, otherwise weights are not comparable.
pub trait TfIdfEngine {
    /// Tag persisted with a fitted vocabulary
    const NAME: &'static str;
    /// IDF of a term that appears in `doc_freq` of `doc_num` documents
    fn idf(doc_num: u64, doc_freq: u64) -> f64;
    /// TF of a term counted `count` times in a document of `term_sum` terms
    fn tf(count: u64, term_sum: u64) -> f64;
    /// Final per-vector step applied after weighting
    fn finish(vec: &mut ZeroSpVec<f64>);
}

/// Default TF-IDF engine
/// - tf: raw count
/// - idf: ln((1 + n) / (1 + df)) + 1
/// - vectors are L2-normalized
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTfIdfEngine;

impl TfIdfEngine for DefaultTfIdfEngine {
    const NAME: &'static str = "default";

    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f64 {
        ((1.0 + doc_num as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
    }

    #[inline]
    fn tf(count: u64, _term_sum: u64) -> f64 {
        count as f64
    }

    #[inline]
    fn finish(vec: &mut ZeroSpVec<f64>) {
        vec.l2_normalize();
    }
}

/// Sublinear variant
/// - tf: 1 + ln(count)
/// - idf and normalization as `DefaultTfIdfEngine`
#[derive(Debug, Clone, Copy, Default)]
pub struct SublinearTfIdfEngine;

impl TfIdfEngine for SublinearTfIdfEngine {
    const NAME: &'static str = "sublinear";

    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f64 {
        DefaultTfIdfEngine::idf(doc_num, doc_freq)
    }

    #[inline]
    fn tf(count: u64, _term_sum: u64) -> f64 {
        if count == 0 {
            return 0.0;
        }
        1.0 + (count as f64).ln()
    }

    #[inline]
    fn finish(vec: &mut ZeroSpVec<f64>) {
        vec.l2_normalize();
    }
}
