use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RecommendError, RecommendResult};

/// Words excluded from vectorization.
/// Matching is exact (after the normalizer has lowercased the text).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwordSet {
    words: IndexSet<String>,
}

impl StopwordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Parse a one-word-per-line list. Lines are trimmed, blank lines skipped.
    pub fn parse(text: &str) -> Self {
        Self::from_words(text.lines())
    }

    /// Read a UTF-8 stopword file
    pub fn load<P: AsRef<Path>>(path: P) -> RecommendResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RecommendError::resource(format!("stopword file {}: {e}", path.display()))
        })?;
        let set = Self::parse(&text);
        info!(path = %path.display(), words = set.len(), "loaded stopwords");
        Ok(set)
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_trims_and_skips_blank_lines() {
        let set = StopwordSet::parse("the\n  and  \n\n的\r\n");
        assert_eq!(set.len(), 3);
        assert!(set.contains("the"));
        assert!(set.contains("and"));
        assert!(set.contains("的"));
        assert!(!set.contains(""));
    }

    #[test]
    fn duplicates_collapse() {
        let set = StopwordSet::from_words(["a", "a", "b"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "students").unwrap();
        writeln!(file, "say").unwrap();
        let set = StopwordSet::load(file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("say"));
    }

    #[test]
    fn missing_file_is_resource_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = StopwordSet::load(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, RecommendError::ResourceUnavailable { .. }));
    }
}
