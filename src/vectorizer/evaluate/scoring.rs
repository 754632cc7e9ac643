use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

use crate::config::{RatingScale, ScoringConfig};

/// Map a raw average rating onto the quality signal.
/// Missing or non-finite ratings map to 0.
#[inline]
pub fn normalize_rating(rating: Option<f64>, scale: RatingScale) -> f64 {
    match rating {
        Some(r) if r.is_finite() => match scale {
            RatingScale::Raw => r,
            RatingScale::Max(max) => (r / max).clamp(0.0, 1.0),
        },
        _ => 0.0,
    }
}

/// composite = w_sim * similarity + w_rating * normalized_rating
#[inline]
pub fn score(similarity: f64, rating: Option<f64>, w_sim: f64, w_rating: f64, scale: RatingScale) -> f64 {
    blend(similarity, normalize_rating(rating, scale), w_sim, w_rating)
}

/// Weighted sum of an already normalized rating and a similarity.
/// Every composite score in the crate is computed here.
#[inline]
pub fn blend(similarity: f64, normalized_rating: f64, w_sim: f64, w_rating: f64) -> f64 {
    w_sim * similarity + w_rating * normalized_rating
}

/// Where a scored row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrigin {
    /// catalog row, by catalog index
    Catalog(usize),
    /// row supplied alongside the catalog (cold start), by input index
    NewEntry(usize),
}

/// A row with every intermediate score, before ranking
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub course_name: String,
    pub teacher_name: String,
    pub origin: RowOrigin,
    pub similarity: f64,
    pub normalized_rating: f64,
    pub composite_score: f64,
}

impl ScoredRow {
    pub fn new(
        course_name: &str,
        teacher_name: &str,
        origin: RowOrigin,
        similarity: f64,
        normalized_rating: f64,
        config: &ScoringConfig,
    ) -> Self {
        Self {
            course_name: course_name.to_string(),
            teacher_name: teacher_name.to_string(),
            origin,
            similarity,
            normalized_rating,
            composite_score: blend(similarity, normalized_rating, config.similarity_weight, config.rating_weight),
        }
    }

    fn into_recommendation(self) -> Recommendation {
        Recommendation {
            course_name: self.course_name,
            teacher_name: self.teacher_name,
            composite_score: self.composite_score,
        }
    }
}

/// One entry of the final ranked list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub course_name: String,
    pub teacher_name: String,
    pub composite_score: f64,
}

/// Structure to store scored rows before truncation
pub struct Hits {
    pub list: Vec<ScoredRow>,
}

impl Hits {
    pub fn new(list: Vec<ScoredRow>) -> Self {
        Hits { list }
    }

    /// Append rows after the current ones.
    /// Later rows lose ties against earlier rows once sorted.
    pub fn extend(&mut self, rows: Vec<ScoredRow>) -> &mut Self {
        self.list.extend(rows);
        self
    }

    /// Sort by descending composite score.
    /// NaN scores are removed; the sort is stable, so ties keep insertion order.
    pub fn sort_by_score(&mut self) -> &mut Self {
        self.list.retain(|r| !r.composite_score.is_nan());
        self.list
            .sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
        self
    }

    /// Drop rows scoring below `min_score`
    pub fn retain_min_score(&mut self, min_score: f64) -> &mut Self {
        self.list.retain(|r| r.composite_score >= min_score);
        self
    }

    /// Sort, filter and cut down to `config.top_n` recommendations
    pub fn into_ranked(mut self, config: &ScoringConfig) -> Vec<Recommendation> {
        self.sort_by_score();
        if let Some(min) = config.min_score {
            self.retain_min_score(min);
        }
        self.list.truncate(config.top_n);
        self.list
            .into_iter()
            .map(ScoredRow::into_recommendation)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl Debug for Hits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // one hit per line
            writeln!(f, "Hits [")?;
            for row in &self.list {
                writeln!(
                    f,
                    "    {} / {}: {:.6} (sim: {:.6}, rating: {:.6}, {:?})",
                    row.course_name, row.teacher_name, row.composite_score, row.similarity, row.normalized_rating, row.origin
                )?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}\t{}\t{}", self.composite_score, self.course_name, self.teacher_name)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn row(name: &str, origin: RowOrigin, sim: f64, rating: f64) -> ScoredRow {
        ScoredRow::new(name, "t", origin, sim, rating, &ScoringConfig::default())
    }

    #[test]
    fn rating_normalization() {
        let scale = RatingScale::Max(5.0);
        assert_eq!(normalize_rating(Some(4.5), scale), 0.9);
        assert_eq!(normalize_rating(Some(7.0), scale), 1.0);
        assert_eq!(normalize_rating(Some(-1.0), scale), 0.0);
        assert_eq!(normalize_rating(None, scale), 0.0);
        assert_eq!(normalize_rating(Some(f64::NAN), scale), 0.0);
        assert_eq!(normalize_rating(Some(4.5), RatingScale::Raw), 4.5);
    }

    #[test]
    fn composite_uses_weights() {
        let s = score(0.5, Some(5.0), 0.7, 0.3, RatingScale::Max(5.0));
        assert!((s - 0.65).abs() < 1e-12);
        assert_eq!(score(0.5, None, 0.7, 0.3, RatingScale::Max(5.0)), 0.35);
    }

    #[test]
    fn ranking_is_stable_and_truncated() {
        let hits = Hits::new(vec![
            row("a", RowOrigin::Catalog(0), 0.1, 0.0),
            row("b", RowOrigin::Catalog(1), 0.5, 0.0),
            row("c", RowOrigin::Catalog(2), 0.1, 0.0),
            row("d", RowOrigin::NewEntry(0), 0.1, 0.0),
        ]);
        let config = ScoringConfig { top_n: 3, ..Default::default() };
        let ranked = hits.into_ranked(&config);
        let names: Vec<&str> = ranked.iter().map(|r| r.course_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn top_n_larger_than_rows_returns_all() {
        let hits = Hits::new(vec![row("a", RowOrigin::Catalog(0), 0.2, 0.0)]);
        let ranked = hits.into_ranked(&ScoringConfig { top_n: 5, ..Default::default() });
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn min_score_filter_can_empty_the_list() {
        let hits = Hits::new(vec![row("a", RowOrigin::Catalog(0), 0.2, 0.0)]);
        let config = ScoringConfig { min_score: Some(0.9), ..Default::default() };
        assert!(hits.into_ranked(&config).is_empty());
    }

    #[test]
    fn nan_rows_are_dropped() {
        let mut hits = Hits::new(vec![
            row("a", RowOrigin::Catalog(0), f64::NAN, 0.0),
            row("b", RowOrigin::Catalog(1), 0.3, 0.0),
        ]);
        hits.sort_by_score();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.list[0].course_name, "b");
    }

    #[test]
    fn display_is_tab_separated() {
        let rec = Recommendation {
            course_name: "Calculus I".into(),
            teacher_name: "Dr. Lee".into(),
            composite_score: 0.5,
        };
        assert_eq!(rec.to_string(), "0.500000\tCalculus I\tDr. Lee");
    }

    fn weighted(ws: f64, wr: f64) -> ScoringConfig {
        ScoringConfig {
            similarity_weight: ws,
            rating_weight: wr,
            ..Default::default()
        }
    }

    /// composite of a row as the ranking path builds it
    fn composite(sim: f64, rating: f64, config: &ScoringConfig) -> f64 {
        let normalized = normalize_rating(Some(rating), config.rating_scale);
        ScoredRow::new("x", "t", RowOrigin::Catalog(0), sim, normalized, config).composite_score
    }

    proptest! {
        #[test]
        fn monotone_in_similarity(s1 in 0.0..=1.0f64, s2 in 0.0..=1.0f64, r in 0.0..=5.0f64,
                                  ws in 0.0..=1.0f64, wr in 0.0..=1.0f64) {
            let (lo, hi) = if s1 <= s2 { (s1, s2) } else { (s2, s1) };
            let config = weighted(ws, wr);
            prop_assert!(composite(lo, r, &config) <= composite(hi, r, &config));
        }

        #[test]
        fn monotone_in_rating(s in 0.0..=1.0f64, r1 in 0.0..=5.0f64, r2 in 0.0..=5.0f64,
                              ws in 0.0..=1.0f64, wr in 0.0..=1.0f64) {
            let (lo, hi) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
            let config = weighted(ws, wr);
            prop_assert!(composite(s, lo, &config) <= composite(s, hi, &config));
        }

        #[test]
        fn scored_rows_agree_with_score(s in 0.0..=1.0f64, r in prop::option::of(-1.0..=7.0f64),
                                        ws in 0.0..=1.0f64, wr in 0.0..=1.0f64) {
            let config = weighted(ws, wr);
            let row = ScoredRow::new(
                "x", "t", RowOrigin::Catalog(0), s,
                normalize_rating(r, config.rating_scale), &config,
            );
            prop_assert_eq!(
                row.composite_score,
                score(s, r, ws, wr, config.rating_scale)
            );
        }

        #[test]
        fn ranked_output_has_no_inversions(sims in prop::collection::vec(0.0..=1.0f64, 0..40), top_n in 1usize..10) {
            let rows: Vec<ScoredRow> = sims.iter().enumerate()
                .map(|(i, s)| row("x", RowOrigin::Catalog(i), *s, 0.0))
                .collect();
            let n = rows.len();
            let ranked = Hits::new(rows).into_ranked(&ScoringConfig { top_n, ..Default::default() });
            prop_assert_eq!(ranked.len(), top_n.min(n));
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].composite_score >= pair[1].composite_score);
            }
        }
    }
}
