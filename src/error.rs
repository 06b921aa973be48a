use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Failed to list bucket under prefix '{prefix}': {source}")]
    Listing {
        prefix: String,
        source: object_store::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] object_store::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),
}
