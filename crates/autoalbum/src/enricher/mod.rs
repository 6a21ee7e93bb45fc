//! OCR correction, categorization and naming for document scans.

pub mod completion;
pub mod error;
pub mod filename;

use tracing::{debug, info_span};

pub use completion::{CompletionService, OpenAiCompletion};
pub use error::{CompletionError, EnrichError};
pub use filename::{sanitize_filename, DEFAULT_FILENAME};

/// Largest slice of OCR text sent in one correction request.
pub const CORRECTION_CHUNK_CHARS: usize = 2000;

/// Prefix of the corrected text used for categorization and naming.
pub const SNIPPET_CHARS: usize = 2048;

const CORRECTION_TEMPERATURE: f32 = 0.5;
const CORRECTION_MAX_TOKENS: u32 = 2000;
const CATEGORY_TEMPERATURE: f32 = 0.3;
const CATEGORY_MAX_TOKENS: u32 = 250;
const NAMING_TEMPERATURE: f32 = 0.3;
const NAMING_MAX_TOKENS: u32 = 100;

const CORRECTION_PROMPT: &str =
    "Correct the following text and output only the corrected text with nothing else added: ";

/// Everything the document branch derives from the OCR text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub corrected_text: String,
    pub category: String,
    pub filename: String,
}

/// A completed enrichment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage<'a> {
    Corrected(&'a str),
    Categorized(&'a str),
    Named(&'a str),
}

pub struct Enricher {
    completion: Box<dyn CompletionService>,
}

impl Enricher {
    pub fn new(completion: Box<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Runs correction, categorization and naming in that order.
    ///
    /// `on_stage` sees each result as soon as it is available.
    pub fn enrich<F>(&self, text: &str, mut on_stage: F) -> Result<Enrichment, EnrichError>
    where
        F: FnMut(Stage<'_>),
    {
        let corrected_text = self.correct(text)?;
        on_stage(Stage::Corrected(&corrected_text));

        let category = self.categorize(&corrected_text)?;
        on_stage(Stage::Categorized(&category));

        let filename = self.name_file(&corrected_text)?;
        on_stage(Stage::Named(&filename));

        Ok(Enrichment {
            corrected_text,
            category,
            filename,
        })
    }

    /// Corrects OCR errors chunk by chunk.
    ///
    /// Chunks are cut every [`CORRECTION_CHUNK_CHARS`] characters, possibly
    /// mid-word. Each response is trimmed and the pieces are joined without
    /// separators. Any failed chunk fails the whole correction.
    pub fn correct(&self, text: &str) -> Result<String, EnrichError> {
        let _span = info_span!("correct_text").entered();

        let chunks = split_chunks(text, CORRECTION_CHUNK_CHARS);
        let total = chunks.len();
        let mut corrected = String::with_capacity(text.len());

        for (index, chunk) in chunks.into_iter().enumerate() {
            let prompt = format!("{}{}", CORRECTION_PROMPT, chunk);
            let response = self
                .completion
                .complete(&prompt, CORRECTION_TEMPERATURE, CORRECTION_MAX_TOKENS)
                .map_err(|source| EnrichError::Correction {
                    chunk: index + 1,
                    total,
                    source,
                })?;
            corrected.push_str(response.trim());
        }

        debug!("Corrected {} chunk(s): {}", total, corrected);
        Ok(corrected)
    }

    /// Asks for a one or two word category for the document.
    pub fn categorize(&self, corrected_text: &str) -> Result<String, EnrichError> {
        let _span = info_span!("categorize").entered();

        let prompt = format!(
            "The snippet is from a document. Please look at the snippet and output a one or two \
             word category. Only output the category and nothing else. Snippet: {}",
            snippet(corrected_text)
        );

        let response = self
            .completion
            .complete(&prompt, CATEGORY_TEMPERATURE, CATEGORY_MAX_TOKENS)
            .map_err(EnrichError::Categorization)?;

        Ok(response.trim().to_string())
    }

    /// Asks for a descriptive file name and sanitizes whatever comes back.
    pub fn name_file(&self, corrected_text: &str) -> Result<String, EnrichError> {
        let _span = info_span!("name_file").entered();

        let prompt = format!(
            "The following is a document snippet: {}. Please generate a meaningful filename for \
             this document. It may be anywhere between one to five words, but words must be \
             separated via underscores and all files should end with .jpg For example \
             2023_W2.jpg: ",
            snippet(corrected_text)
        );

        let response = self
            .completion
            .complete(&prompt, NAMING_TEMPERATURE, NAMING_MAX_TOKENS)
            .map_err(EnrichError::Naming)?;

        let filename = sanitize_filename(&response);
        debug!("Model suggested {:?}, using {}", response.trim(), filename);
        Ok(filename)
    }
}

/// Splits `text` into pieces of at most `max_chars` characters.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);

    chunks
}

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}
