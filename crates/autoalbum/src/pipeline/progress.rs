use std::path::PathBuf;

use tracing::{info, warn};

use crate::classifier::Classification;

/// Events emitted by the pipeline while a file is processed.
/// Text bodies are omitted; they can be large.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Classified {
        classification: Classification,
        word_count: usize,
    },
    Corrected {
        chars: usize,
    },
    Categorized {
        category: String,
    },
    Named {
        filename: String,
    },
    MetadataWritten,
    Relocated {
        final_path: PathBuf,
    },
    Labeled {
        labels: Vec<String>,
    },
    Failed {
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Reports to the log, one line per event.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Classified {
                classification,
                word_count,
            } => info!("Classified as {} ({} words)", classification, word_count),
            ProgressEvent::Corrected { chars } => info!("Corrected text ({} chars)", chars),
            ProgressEvent::Categorized { category } => info!("Category: {}", category),
            ProgressEvent::Named { filename } => info!("Filename: {}", filename),
            ProgressEvent::MetadataWritten => info!("Stored corrected text in image metadata"),
            ProgressEvent::Relocated { final_path } => info!(
                "Moved to {}",
                crate::sanitize::redact_path(&final_path)
            ),
            ProgressEvent::Labeled { labels } => {
                if labels.is_empty() {
                    info!("No labels found");
                } else {
                    info!("Labels: {}", labels.join(", "));
                }
            }
            ProgressEvent::Failed { error } => warn!("Failed: {}", error),
        }
    }
}
