//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Write error: {message}")]
    WriteError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for I/O operations
pub type Result<T> = std::result::Result<T, IoError>;

impl From<IoError> for sonarcloud_core::Error {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Io(inner) => sonarcloud_core::Error::Io(inner),
            other => sonarcloud_core::Error::InvalidData(other.to_string()),
        }
    }
}
