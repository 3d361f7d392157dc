use thiserror::Error;

/// Failures talking to the upstream chat-completion provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request to provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider response contained no completion text")]
    EmptyCompletion,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("'{0}' is not a PDF document")]
    NotPdf(String),

    #[error("Document is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("No text could be extracted from the document")]
    Empty,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored metadata is invalid: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document is {size} bytes, only documents up to {limit} bytes are persisted")]
    TooLarge { size: usize, limit: usize },

    #[error("Stored document is corrupted: {0}")]
    Corrupted(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// Failures talking to a running relay server
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Relay returned status {0}")]
    Status(u16),
}
