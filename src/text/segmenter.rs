use jieba_rs::Jieba;

/// Word segmentation engine.
///
/// Implementations split a filtered, lowercased string into word candidates.
/// Returned slices may include whitespace runs; the normalizer discards them.
pub trait Segmenter: Send + Sync {
    fn segment<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Dictionary + HMM segmenter for mixed Chinese / Latin text
pub struct JiebaSegmenter {
    jieba: Jieba,
    hmm: bool,
}

impl JiebaSegmenter {
    /// Load the bundled dictionary with HMM enabled for unknown words
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
            hmm: true,
        }
    }

    /// Dictionary-only segmentation, unknown CJK runs fall back to single characters
    pub fn without_hmm() -> Self {
        Self {
            jieba: Jieba::new(),
            hmm: false,
        }
    }
}

impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter for JiebaSegmenter {
    #[inline]
    fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.jieba.cut(text, self.hmm)
    }
}

impl std::fmt::Debug for JiebaSegmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiebaSegmenter").field("hmm", &self.hmm).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tests::shared_segmenter;

    #[test]
    fn latin_words_stay_whole() {
        let seg = shared_segmenter();
        let words: Vec<&str> = seg
            .segment("clear explanations")
            .into_iter()
            .filter(|w| !w.trim().is_empty())
            .collect();
        assert_eq!(words, vec!["clear", "explanations"]);
    }

    #[test]
    fn chinese_is_split_into_words() {
        let seg = shared_segmenter();
        let words = seg.segment("我们中出了一个叛徒");
        assert!(words.len() > 1);
        assert_eq!(words.concat(), "我们中出了一个叛徒");
        assert!(words.contains(&"我们"));
    }
}
