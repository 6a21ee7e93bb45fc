//! Helpers for sanitizing data before it enters logs and tracing spans.
//!
//! Scans often contain personal documents, so spans carry file names rather
//! than full paths, and service error bodies are truncated.

use std::path::Path;

/// Maximum length of an external service body quoted in an error or log line.
pub const MAX_LOGGED_BODY_LENGTH: usize = 200;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Truncates a service response body so it can be logged without flooding
/// the output or echoing large payloads.
pub fn truncate_for_log(body: &str) -> String {
    match body.char_indices().nth(MAX_LOGGED_BODY_LENGTH) {
        Some((cut, _)) => format!("{}... (truncated)", &body[..cut]),
        None => body.to_string(),
    }
}
