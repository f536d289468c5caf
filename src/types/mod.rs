//! Type definitions for homescore

mod error;
mod listing;
mod score;

pub use error::*;
pub use listing::*;
pub use score::*;

/// Non-fatal problem encountered while loading listings
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// A record could not be decoded and was skipped
    SkippedRecord { index: usize, reason: String },
    /// A listing id appeared more than once; later copies were dropped
    DuplicateId(String),
    /// A file in a directory source could not be read
    UnreadableFile(String),
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SkippedRecord { index, reason } => {
                write!(f, "record #{} skipped: {}", index, reason)
            }
            Self::DuplicateId(id) => write!(f, "duplicate listing id {}", id),
            Self::UnreadableFile(msg) => write!(f, "unreadable file: {}", msg),
        }
    }
}
