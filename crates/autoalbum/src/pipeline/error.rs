use thiserror::Error;

use crate::enricher::EnrichError;
use crate::error::{MetadataError, ProcessError, StorageError};

/// Per-file failures. None of these stop the batch.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Reading image failed: {0}")]
    Read(#[from] ProcessError),

    #[error("Enrichment failed: {0}")]
    Enrich(#[from] EnrichError),

    #[error("Writing metadata failed: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Relocation failed: {0}")]
    Relocation(#[from] StorageError),
}
