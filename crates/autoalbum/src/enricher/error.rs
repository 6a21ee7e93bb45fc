use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Completion service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Completion response contained no choices")]
    EmptyResponse,

    #[error("Failed to decode completion response: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Text correction failed on chunk {chunk} of {total}: {source}")]
    Correction {
        chunk: usize,
        total: usize,
        #[source]
        source: CompletionError,
    },

    #[error("Categorization failed: {0}")]
    Categorization(#[source] CompletionError),

    #[error("Filename generation failed: {0}")]
    Naming(#[source] CompletionError),
}
