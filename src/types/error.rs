use thiserror::Error;

/// homescore error types
#[derive(Error, Debug)]
pub enum HomescoreError {
    /// Failed to parse listing JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Listings endpoint could not be fetched
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Watch service failure
    #[error("watch error: {0}")]
    Watch(String),
}

/// Result type alias for homescore
pub type Result<T> = std::result::Result<T, HomescoreError>;
