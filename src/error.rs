//! Error types for descriptor parsing and book packing.

use thiserror::Error;

/// Errors that can occur while parsing a descriptor or packing a book.
#[derive(Error, Debug)]
pub enum Error {
    /// The descriptor violates one of its rules (duplicate or missing key,
    /// bad date or language, nonexistent path, malformed URL).
    #[error("{0}")]
    Descriptor(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
}

impl Error {
    pub(crate) fn descriptor(message: impl Into<String>) -> Self {
        Error::Descriptor(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
