//! Error types for sonarcloud

use thiserror::Error;

/// Main error type for sonarcloud operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for sonarcloud operations
pub type Result<T> = std::result::Result<T, Error>;
