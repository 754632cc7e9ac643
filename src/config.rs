use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RecommendError, RecommendResult};

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_SIMILARITY_WEIGHT: f64 = 0.7;
pub const DEFAULT_RATING_WEIGHT: f64 = 0.3;
pub const DEFAULT_RATING_MAX: f64 = 5.0;
pub const DEFAULT_MIN_TERM_CHARS: usize = 2;

/// How a raw average rating is mapped onto the quality signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingScale {
    /// rating used as-is
    Raw,
    /// rating divided by the scale maximum and clamped to [0, 1]
    Max(f64),
}

impl Default for RatingScale {
    fn default() -> Self {
        RatingScale::Max(DEFAULT_RATING_MAX)
    }
}

/// Scoring parameters for one recommendation call.
///
/// The two weights are not required to sum to 1.0. Keeping the blend sensible
/// is up to the caller; only each weight's range is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Number of results returned
    pub top_n: usize,
    pub similarity_weight: f64,
    pub rating_weight: f64,
    pub rating_scale: RatingScale,
    /// Rows scoring below this are dropped before truncation
    pub min_score: Option<f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            similarity_weight: DEFAULT_SIMILARITY_WEIGHT,
            rating_weight: DEFAULT_RATING_WEIGHT,
            rating_scale: RatingScale::default(),
            min_score: None,
        }
    }
}

impl ScoringConfig {
    /// Reject parameters that would make scoring meaningless.
    /// Each weight must be finite and within [0.0, 1.0].
    pub fn validate(&self) -> RecommendResult<()> {
        if self.top_n == 0 {
            return Err(RecommendError::config("top_n", "must be a positive integer"));
        }
        check_weight("similarity_weight", self.similarity_weight)?;
        check_weight("rating_weight", self.rating_weight)?;
        if let RatingScale::Max(max) = self.rating_scale {
            if !max.is_finite() || max <= 0.0 {
                return Err(RecommendError::config(
                    "rating_scale",
                    format!("maximum must be finite and positive, got {max}"),
                ));
            }
        }
        if let Some(min) = self.min_score {
            if !min.is_finite() {
                return Err(RecommendError::config(
                    "min_score",
                    format!("must be finite, got {min}"),
                ));
            }
        }
        Ok(())
    }
}

fn check_weight(parameter: &'static str, weight: f64) -> RecommendResult<()> {
    if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
        return Err(RecommendError::config(
            parameter,
            format!("must be within [0.0, 1.0], got {weight}"),
        ));
    }
    Ok(())
}

/// Text analysis parameters fixed into the vocabulary at fit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// terms with fewer characters are ignored at fit and transform time
    pub min_term_chars: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            min_term_chars: DEFAULT_MIN_TERM_CHARS,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    pub scoring: ScoringConfig,
    pub vectorizer: VectorizerConfig,
}

impl RecommenderConfig {
    pub fn from_toml_str(text: &str) -> RecommendResult<Self> {
        let config: RecommenderConfig = toml::from_str(text)?;
        config.scoring.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> RecommendResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
