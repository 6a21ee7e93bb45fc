use std::path::PathBuf;
use thiserror::Error;

use crate::enricher::CompletionError;
use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum AutoalbumError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Completion service error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Missing required configuration value '{field}'")]
    MissingValue { field: &'static str },

    #[error("Failed to resolve credential '{field}': {source}")]
    Credential {
        field: &'static str,
        #[source]
        source: SecretError,
    },
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to read image '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR failed: {0}")]
    OcrFailed(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move file from '{from}' to '{to}': {source}")]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Copy of '{from}' to '{to}' is incomplete: expected {expected} bytes, found {actual}")]
    VerifyFailed {
        from: PathBuf,
        to: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("File already exists: {0}")]
    FileExists(PathBuf),

    #[error("Invalid destination file name: '{0}'")]
    InvalidFileName(String),
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read image '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse metadata of '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Unsupported image container for metadata: '{0}'")]
    UnsupportedFormat(PathBuf),

    #[error("Metadata block of {size} bytes exceeds the 65533 byte segment limit")]
    TooLarge { size: usize },

    #[error("Failed to encode metadata: {0}")]
    Encode(String),

    #[error("Failed to write image '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Pictures directory '{0}' does not exist")]
    MissingDirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, AutoalbumError>;
