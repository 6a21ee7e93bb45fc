use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::classifier::Classification;
use crate::error::ProcessError;

/// One discovered image moving through the pipeline.
///
/// Content, text and classification are each filled at most once.
#[derive(Debug)]
pub struct ImageRecord {
    pub id: String,
    pub source_path: PathBuf,
    content: OnceCell<Vec<u8>>,
    text: OnceCell<String>,
    classification: OnceCell<Classification>,
}

impl ImageRecord {
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_path,
            content: OnceCell::new(),
            text: OnceCell::new(),
            classification: OnceCell::new(),
        }
    }

    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The file's bytes, read from disk on first access.
    pub fn content(&self) -> Result<&[u8], ProcessError> {
        if let Some(bytes) = self.content.get() {
            return Ok(bytes);
        }

        let bytes = fs::read(&self.source_path).map_err(|source| ProcessError::ReadDocument {
            path: self.source_path.clone(),
            source,
        })?;
        Ok(self.content.get_or_init(|| bytes))
    }

    pub fn text(&self) -> Option<&str> {
        self.text.get().map(String::as_str)
    }

    /// Stores the extracted text; later calls keep the first value.
    pub fn record_text(&self, text: String) -> &str {
        self.text.get_or_init(|| text)
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification.get().copied()
    }

    /// Stores the classification; later calls keep the first value.
    pub fn record_classification(&self, classification: Classification) -> Classification {
        *self.classification.get_or_init(|| classification)
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

/// What processing a single file produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Document { final_path: PathBuf, category: String },
    Photo { labels: Vec<String> },
    Failed { error: String },
}

#[derive(Debug)]
pub struct FileResult {
    pub record_id: String,
    pub source_path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileResult {
    pub fn document(record: &ImageRecord, final_path: PathBuf, category: String) -> Self {
        Self::new(record, FileOutcome::Document { final_path, category })
    }

    pub fn photo(record: &ImageRecord, labels: Vec<String>) -> Self {
        Self::new(record, FileOutcome::Photo { labels })
    }

    pub fn failure(record: &ImageRecord, error: String) -> Self {
        Self::new(record, FileOutcome::Failed { error })
    }

    fn new(record: &ImageRecord, outcome: FileOutcome) -> Self {
        Self {
            record_id: record.id.clone(),
            source_path: record.source_path.clone(),
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, FileOutcome::Failed { .. })
    }
}
