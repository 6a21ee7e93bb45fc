//! Document/photo decision based on how much text OCR found.

use std::fmt;

/// Images with more words than this are treated as documents.
pub const DOCUMENT_WORD_THRESHOLD: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Text-heavy scan: corrected, renamed and archived.
    Document,
    /// Everything else: labelled, never modified.
    Photo,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Document => "document",
            Classification::Photo => "photo",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of whitespace-delimited words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Classifies OCR output. Empty text (including OCR failure) is a photo.
pub fn classify(text: &str) -> Classification {
    if word_count(text) > DOCUMENT_WORD_THRESHOLD {
        Classification::Document
    } else {
        Classification::Photo
    }
}
