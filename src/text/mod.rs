pub mod segmenter;
pub mod stopwords;

use std::sync::Arc;

use crate::text::{segmenter::Segmenter, stopwords::StopwordSet};

/// Keep only CJK unified ideographs (U+4E00..=U+9FA5), ASCII letters and whitespace.
/// Everything else is removed, not replaced.
#[inline]
pub fn is_retained_char(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c) || c.is_ascii_alphabetic() || c.is_whitespace()
}

/// Character filter + lowercase, the step before segmentation
pub fn filter_text(text: &str) -> String {
    text.chars()
        .filter(|c| is_retained_char(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Text normalization pipeline shared by corpus building and query handling:
/// character filter, lowercase, word segmentation, stopword removal.
///
/// Every string that is vectorized against a vocabulary must go through the same
/// normalizer that was used when the vocabulary was fitted.
#[derive(Clone)]
pub struct TextNormalizer {
    segmenter: Arc<dyn Segmenter>,
    stopwords: Arc<StopwordSet>,
}

impl TextNormalizer {
    pub fn new(segmenter: Arc<dyn Segmenter>, stopwords: Arc<StopwordSet>) -> Self {
        Self {
            segmenter,
            stopwords,
        }
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    /// Retained tokens in text order.
    ///
    /// Segmentation is repeated on each token until no token splits further, so
    /// normalizing already normalized text gives the same tokens back.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let filtered = filter_text(text);
        if filtered.trim().is_empty() {
            return Vec::new();
        }
        let mut words = self.split(&[filtered.as_str()]);
        loop {
            // segments only ever refine their input, so this terminates
            let next = self.split(&words);
            if next == words {
                break;
            }
            words = next;
        }
        words
            .into_iter()
            .filter(|tok| !self.stopwords.contains(tok))
            .map(str::to_string)
            .collect()
    }

    fn split<'a>(&self, parts: &[&'a str]) -> Vec<&'a str> {
        parts
            .iter()
            .flat_map(|part| self.segmenter.segment(*part))
            .map(str::trim)
            .filter(|tok| !tok.is_empty())
            .collect()
    }

    /// Space-joined retained tokens. Empty input gives an empty string.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    /// Substitute text for a course without reviews
    pub fn normalize_metadata(&self, course_name: &str, teacher_name: &str) -> String {
        self.normalize(&format!("{course_name} {teacher_name}"))
    }
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, OnceLock};

    use proptest::prelude::*;

    use super::*;
    use crate::text::segmenter::JiebaSegmenter;

    /// the dictionary load is slow in debug builds, share one per test binary
    pub(crate) fn shared_segmenter() -> Arc<JiebaSegmenter> {
        static SEGMENTER: OnceLock<Arc<JiebaSegmenter>> = OnceLock::new();
        SEGMENTER.get_or_init(|| Arc::new(JiebaSegmenter::new())).clone()
    }

    pub(crate) fn normalizer_with(stopwords: &[&str]) -> TextNormalizer {
        TextNormalizer::new(shared_segmenter(), Arc::new(StopwordSet::from_words(stopwords)))
    }

    #[test]
    fn filter_strips_digits_punctuation_and_symbols() {
        assert_eq!(filter_text("C++ 101: Intro!"), "c  intro");
        assert_eq!(filter_text("数学，幽默😀"), "数学幽默");
        assert_eq!(filter_text("ÉTUDE"), "tude");
    }

    #[test]
    fn normalize_lowercases_and_drops_stopwords() {
        let n = normalizer_with(&["and", "say"]);
        assert_eq!(
            n.normalize("Students SAY: clear explanations, and patient!!"),
            "students clear explanations patient"
        );
    }

    #[test]
    fn normalize_segments_chinese() {
        let n = normalizer_with(&["的"]);
        let out = n.normalize("老师的讲解很清晰");
        assert!(!out.contains('的'));
        assert!(out.contains(' '));
        assert_eq!(out.replace(' ', ""), "老师讲解很清晰");
    }

    #[test]
    fn empty_and_noise_only_inputs_give_empty_output() {
        let n = normalizer_with(&["the"]);
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   "), "");
        assert_eq!(n.normalize("123 !!! ??? 42"), "");
        assert_eq!(n.normalize("The THE the"), "");
    }

    #[test]
    fn metadata_text_joins_course_and_teacher() {
        let n = normalizer_with(&[]);
        assert_eq!(n.normalize_metadata("New Seminar", "Dr. Park"), "new seminar dr park");
    }

    const WORDS: &[&str] = &[
        "clear", "explanations", "humor", "rigorous", "math", "and", "the", "patient",
        "Workload", "LAB", "seminar", "x",
    ];
    const SEPARATORS: &[&str] = &[" ", ", ", "! ", " 42 ", "\t"];

    fn sentence() -> impl Strategy<Value = String> {
        prop::collection::vec(
            (prop::sample::select(WORDS), prop::sample::select(SEPARATORS)),
            0..12,
        )
        .prop_map(|parts| parts.into_iter().map(|(w, sep)| format!("{w}{sep}")).collect())
    }

    const CHINESE: &[&str] = &[
        "我们中出了一个叛徒",
        "老师讲解很清晰",
        "作业太多了",
        "这门课的考试很难",
        "上课幽默风趣",
        "数学证明非常严谨",
        "小明硕士毕业于中国科学院计算所",
        "他来到了网易杭研大厦",
    ];

    fn chinese_sentence() -> impl Strategy<Value = String> {
        prop::collection::vec(
            (prop::sample::select(CHINESE), prop::sample::select(SEPARATORS)),
            1..4,
        )
        .prop_map(|parts| parts.into_iter().map(|(w, sep)| format!("{w}{sep}")).collect())
    }

    #[test]
    fn hmm_joined_words_are_split_to_a_fixed_point() {
        let n = normalizer_with(&["的", "很", "了"]);
        for text in CHINESE {
            let once = n.normalize(text);
            assert_eq!(n.normalize(&once), once, "input: {text}");
        }
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(text in sentence()) {
            let n = normalizer_with(&["and", "the"]);
            let once = n.normalize(&text);
            prop_assert_eq!(n.normalize(&once), once);
        }

        #[test]
        fn normalize_is_idempotent_on_chinese(text in chinese_sentence(), latin in sentence()) {
            let n = normalizer_with(&["的", "很", "了", "and"]);
            let mixed = format!("{text}{latin}");
            let once = n.normalize(&mixed);
            prop_assert_eq!(n.normalize(&once), once);
        }

        #[test]
        fn normalized_output_has_single_spaces(text in sentence()) {
            let n = normalizer_with(&["and", "the"]);
            let out = n.normalize(&text);
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
        }
    }
}
