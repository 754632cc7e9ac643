use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RecommendError, RecommendResult};

/// Whether a row can be matched on its reviews or only on its metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    HasReviews,
    MetadataOnly,
}

/// One course taught by one teacher.
///
/// CSV columns: `course_id,course_name,teacher_name,review_text,avg_rating`.
/// `course_id` may be omitted, empty `review_text` / `avg_rating` cells load as `None`
/// and an unparsable rating loads as `None` too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default, alias = "id")]
    pub course_id: String,
    pub course_name: String,
    pub teacher_name: String,
    #[serde(default)]
    pub review_text: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub avg_rating: Option<f64>,
}

impl CatalogEntry {
    pub fn new(course_id: &str, course_name: &str, teacher_name: &str) -> Self {
        Self {
            course_id: course_id.to_string(),
            course_name: course_name.to_string(),
            teacher_name: teacher_name.to_string(),
            review_text: None,
            avg_rating: None,
        }
    }

    pub fn with_reviews(mut self, review_text: &str, avg_rating: Option<f64>) -> Self {
        self.review_text = Some(review_text.to_string());
        self.avg_rating = avg_rating;
        self
    }

    pub fn kind(&self) -> EntryKind {
        match &self.review_text {
            Some(text) if !text.trim().is_empty() => EntryKind::HasReviews,
            _ => EntryKind::MetadataOnly,
        }
    }

    /// review text, empty when missing
    #[inline]
    pub fn review_text(&self) -> &str {
        self.review_text.as_deref().unwrap_or("")
    }
}

/// Catalog table, immutable once loaded.
/// Row order is significant: it is the corpus matrix row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Rows without an id get their 1-based row number
    pub fn new(mut entries: Vec<CatalogEntry>) -> Self {
        for (i, entry) in entries.iter_mut().enumerate() {
            if entry.course_id.trim().is_empty() {
                entry.course_id = (i + 1).to_string();
            }
        }
        let catalog = Self { entries };
        catalog.warn_suspicious_rows();
        catalog
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> RecommendResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let entries = rdr
            .deserialize::<CatalogEntry>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries))
    }

    pub fn load_csv<P: AsRef<Path>>(path: P) -> RecommendResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| RecommendError::resource(format!("catalog {}: {e}", path.display())))?;
        let catalog = Self::from_csv_reader(file)?;
        info!(
            path = %path.display(),
            rows = catalog.len(),
            reviewed = catalog.iter().filter(|e| e.kind() == EntryKind::HasReviews).count(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    fn warn_suspicious_rows(&self) {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for (row, entry) in self.entries.iter().enumerate() {
            if entry.course_name.trim().is_empty() {
                warn!(row, course_id = %entry.course_id, "catalog row has no course name");
            }
            if !seen.insert(entry.course_id.as_str()) {
                warn!(row, course_id = %entry.course_id, "duplicate course id in catalog");
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.course_id.as_str()).collect()
    }
}

impl From<Vec<CatalogEntry>> for Catalog {
    fn from(entries: Vec<CatalogEntry>) -> Self {
        Catalog::new(entries)
    }
}
