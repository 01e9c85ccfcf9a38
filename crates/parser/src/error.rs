use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParserError>;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid feed pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },

    #[error("File too large: {path} ({size} bytes > {limit})")]
    FileTooLarge {
        path: String,
        size: u64,
        limit: u64,
    },

    #[error("{0}")]
    Other(String),
}
