use indexmap::IndexMap;

/// TermFrequency struct
/// Counts the occurrences of each term in one normalized document.
///
/// # Examples
/// ```
/// use course_recommender::TermFrequency;
/// let mut term_freq = TermFrequency::new();
/// term_freq.add_term("math");
/// term_freq.add_term("humor");
/// term_freq.add_term("math");
///
/// assert_eq!(term_freq.term_count("math"), 2);
/// assert_eq!(term_freq.term_sum(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermFrequency {
    term_count: IndexMap<String, u64>,
    total_term_count: u64,
}

impl TermFrequency {
    /// Create a new TermFrequency
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the whitespace-separated terms of an already normalized string.
    /// Terms shorter than `min_chars` characters are skipped.
    pub fn from_normalized(text: &str, min_chars: usize) -> Self {
        let mut freq = Self::new();
        for term in text.split_whitespace() {
            if term.chars().count() >= min_chars {
                freq.add_term(term);
            }
        }
        freq
    }

    /// Add a term
    ///
    /// # Arguments
    /// * `term` - term to add
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        let count = self.term_count.entry(term.to_string()).or_insert(0);
        *count += 1;
        self.total_term_count += 1;
        self
    }

    /// Occurrence count of `term`, 0 if absent
    #[inline]
    pub fn term_count(&self, term: &str) -> u64 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    /// total number of terms counted
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    /// number of distinct terms
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }

    /// `(term, count)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.term_count.iter().map(|(t, c)| (t.as_str(), *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_order() {
        let mut freq = TermFrequency::new();
        freq.add_term("b").add_term("a").add_term("b");
        assert_eq!(freq.term_count("b"), 2);
        assert_eq!(freq.term_count("zzz"), 0);
        assert_eq!(freq.term_sum(), 3);
        assert_eq!(freq.term_num(), 2);
        let order: Vec<&str> = freq.iter().map(|(t, _)| t).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn from_normalized_skips_short_terms() {
        let freq = TermFrequency::from_normalized("a  math  of math 数 数学", 2);
        assert_eq!(freq.term_count("math"), 2);
        assert_eq!(freq.term_count("of"), 1);
        assert_eq!(freq.term_count("a"), 0);
        assert_eq!(freq.term_count("数"), 0);
        assert_eq!(freq.term_count("数学"), 1);
        assert_eq!(freq.term_sum(), 4);
    }

    #[test]
    fn empty_text_is_empty() {
        assert!(TermFrequency::from_normalized("", 1).is_empty());
        assert!(TermFrequency::from_normalized("   ", 0).is_empty());
    }
}
