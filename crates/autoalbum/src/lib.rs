pub mod classifier;
pub mod config;
pub mod enricher;
pub mod error;
pub mod http;
pub mod labeler;
pub mod metadata;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod secrets;
pub mod storage;
pub mod worker;

pub use classifier::{classify, Classification, DOCUMENT_WORD_THRESHOLD};
pub use config::{load_config, Config};
pub use enricher::{CompletionService, Enricher, Enrichment};
pub use error::{
    AutoalbumError, ConfigError, MetadataError, ProcessError, Result, StorageError, WorkerError,
};
pub use labeler::PhotoLabeler;
pub use pipeline::{Pipeline, PipelineConfig, PipelineContext};
pub use processor::TextExtractor;
pub use secrets::{resolve_secret, SecretError};
pub use storage::{relocate, Relocator};
pub use worker::{BatchRunner, BatchSummary, DirectoryScanner, FileOutcome, ImageRecord};
