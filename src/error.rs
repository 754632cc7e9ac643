/// Errors raised by the recommendation engine and its resource loaders.
///
/// Empty queries and filtered-out results are not errors; they come back as
/// ordinary (possibly empty) result lists.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("resource unavailable: {reason}")]
    ResourceUnavailable { reason: String },

    #[error("invalid configuration for `{parameter}`: {reason}")]
    InvalidConfiguration {
        parameter: &'static str,
        reason: String,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("model bundle encoding error: {0}")]
    Cbor(#[from] serde_cbor::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RecommendError {
    pub(crate) fn resource(reason: impl Into<String>) -> Self {
        RecommendError::ResourceUnavailable {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(parameter: &'static str, reason: impl Into<String>) -> Self {
        RecommendError::InvalidConfiguration {
            parameter,
            reason: reason.into(),
        }
    }
}

pub type RecommendResult<T> = Result<T, RecommendError>;
