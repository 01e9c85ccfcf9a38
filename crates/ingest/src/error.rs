use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parser error: {0}")]
    ParserError(#[from] feedlens_parser::ParserError),

    #[error("Store error: {0}")]
    StoreError(#[from] feedlens_store::StoreError),

    /// The only unrecoverable initialization failure: the watch directory
    /// cannot be created or opened.
    #[error("Watcher initialization failed: {0}")]
    WatchInit(String),

    #[error("{0}")]
    Other(String),
}
