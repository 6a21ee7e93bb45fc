use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info};

use crate::pipeline::{ConfirmationGate, Pipeline, PipelineContext, ProgressReporter};
use crate::sanitize;
use crate::worker::record::{FileOutcome, ImageRecord};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub documents: usize,
    pub photos: usize,
    pub failed: usize,
    pub stopped_early: bool,
}

/// Drives the pipeline over scanned records, one at a time, in order.
pub struct BatchRunner {
    pipeline: Pipeline,
    gate: Box<dyn ConfirmationGate>,
    shutdown: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(pipeline: Pipeline, gate: Box<dyn ConfirmationGate>) -> Self {
        Self {
            pipeline,
            gate,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares a flag (set from the Ctrl-C handler) checked between files.
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn run(
        &mut self,
        records: Vec<ImageRecord>,
        progress: &dyn ProgressReporter,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let total = records.len();

        for (index, record) in records.into_iter().enumerate() {
            if self.shutdown.load(Ordering::Relaxed) {
                info!("Shutdown requested, stopping before {}", record.file_name());
                summary.stopped_early = true;
                break;
            }

            info!("Processing {} ({}/{})", record.file_name(), index + 1, total);
            let (result, _ctx) = self.pipeline.run(PipelineContext::new(record), progress);
            summary.processed += 1;

            match &result.outcome {
                FileOutcome::Document {
                    final_path,
                    category,
                } => {
                    summary.documents += 1;
                    info!(
                        "Archived {} as {} (category: {})",
                        sanitize::redact_path(&result.source_path),
                        final_path.display(),
                        category
                    );
                }
                FileOutcome::Photo { labels } => {
                    summary.photos += 1;
                    info!(
                        "Labeled {}: {}",
                        sanitize::redact_path(&result.source_path),
                        labels.join(", ")
                    );
                }
                FileOutcome::Failed { error: message } => {
                    summary.failed += 1;
                    error!(
                        "Failed to process {}: {}",
                        result.source_path.display(),
                        message
                    );
                }
            }

            // Nothing left to confirm after the last file
            if index + 1 < total && !self.gate.should_continue() {
                info!("Stopping at user request");
                summary.stopped_early = true;
                break;
            }
        }

        summary
    }
}
