//! Turns free-form model output into a filesystem-safe file name.

use std::sync::LazyLock;

use regex::Regex;

/// Used whenever the model output contains no usable name.
pub const DEFAULT_FILENAME: &str = "default_filename.jpg";

/// Extension every generated document name must end with.
pub const FILENAME_EXTENSION: &str = ".jpg";

static RE_FILENAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[\w_]+\.jpg\b").unwrap());

/// Returns the first `word_chars.jpg` token in `output`, if any.
///
/// The match cannot contain path separators, whitespace or other punctuation,
/// so the result is always a single path component.
pub fn extract_filename(output: &str) -> Option<String> {
    RE_FILENAME.find(output).map(|m| m.as_str().to_string())
}

/// Sanitizes model output into a file name, substituting
/// [`DEFAULT_FILENAME`] when nothing matches.
pub fn sanitize_filename(output: &str) -> String {
    extract_filename(output.trim()).unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}
