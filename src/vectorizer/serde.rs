use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RecommendError, RecommendResult};
use crate::text::stopwords::StopwordSet;
use crate::vectorizer::{
    corpus::CorpusMatrix,
    tfidf::{DefaultTfIdfEngine, TfIdfEngine},
    Vocabulary,
};

/// bumped whenever the persisted layout changes
pub const MODEL_FORMAT_VERSION: u32 = 2;

/// Output of the offline build: everything query time needs besides the catalog.
///
/// The stopword set travels with the vocabulary so that query normalization can
/// never drift from the normalization used when the vocabulary was fitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "E: TfIdfEngine",
    deserialize = "E: TfIdfEngine"
))]
pub struct ModelBundle<E = DefaultTfIdfEngine>
where
    E: TfIdfEngine,
{
    pub version: u32,
    pub stopwords: StopwordSet,
    pub vocabulary: Vocabulary<E>,
    pub matrix: CorpusMatrix,
}

impl<E> ModelBundle<E>
where
    E: TfIdfEngine,
{
    pub fn new(stopwords: StopwordSet, vocabulary: Vocabulary<E>, matrix: CorpusMatrix) -> Self {
        Self {
            version: MODEL_FORMAT_VERSION,
            stopwords,
            vocabulary,
            matrix,
        }
    }

    /// Structural checks: format version, vocabulary, matrix width
    pub fn validate(&self) -> RecommendResult<()> {
        if self.version != MODEL_FORMAT_VERSION {
            return Err(RecommendError::resource(format!(
                "model format version {} is not supported (expected {})",
                self.version, MODEL_FORMAT_VERSION
            )));
        }
        self.vocabulary.validate()?;
        self.matrix.validate()?;
        if self.matrix.dim() != self.vocabulary.len() {
            return Err(RecommendError::resource(format!(
                "corpus matrix width {} does not match vocabulary size {}",
                self.matrix.dim(),
                self.vocabulary.len()
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> RecommendResult<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Decode and validate. Any failure is reported as an unavailable resource.
    pub fn from_bytes(bytes: &[u8]) -> RecommendResult<Self> {
        let bundle: Self = serde_cbor::from_slice(bytes)
            .map_err(|e| RecommendError::resource(format!("model bundle is malformed: {e}")))?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> RecommendResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_cbor::to_writer(&mut writer, self)?;
        writer.flush()?;
        info!(
            path = %path.display(),
            terms = self.vocabulary.len(),
            rows = self.matrix.len(),
            "saved model bundle"
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> RecommendResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| RecommendError::resource(format!("model bundle {}: {e}", path.display())))?;
        let bundle: Self = serde_cbor::from_reader(BufReader::new(file)).map_err(|e| {
            RecommendError::resource(format!("model bundle {} is malformed: {e}", path.display()))
        })?;
        bundle.validate()?;
        info!(
            path = %path.display(),
            terms = bundle.vocabulary.len(),
            rows = bundle.matrix.len(),
            stopwords = bundle.stopwords.len(),
            "loaded model bundle"
        );
        Ok(bundle)
    }
}
