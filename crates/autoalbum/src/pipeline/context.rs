use std::path::PathBuf;

use crate::enricher::Enrichment;
use crate::worker::record::ImageRecord;

pub struct PipelineContext {
    // Input; text and classification are recorded on it by the first steps
    pub record: ImageRecord,

    // Document branch
    pub enrichment: Option<Enrichment>,
    pub final_path: Option<PathBuf>,

    // Photo branch
    pub labels: Vec<String>,
}

impl PipelineContext {
    pub fn new(record: ImageRecord) -> Self {
        Self {
            record,
            enrichment: None,
            final_path: None,
            labels: Vec::new(),
        }
    }
}
