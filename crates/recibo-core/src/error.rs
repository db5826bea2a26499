//! Error types for the recibo-core library.

use thiserror::Error;

/// Main error type for the recibo library.
#[derive(Error, Debug)]
pub enum ReciboError {
    /// Extraction service error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Backup error.
    #[error("backup error: {0}")]
    Backup(#[from] BackupError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Too many same-named files in the output directory.
    #[error("too many collisions for base name '{0}'")]
    NameCollision(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The batch was cancelled before completion.
    #[error("processing cancelled")]
    Cancelled,
}

/// Errors from the extraction service collaborator.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The image file could not be read or is not a usable image.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Network or HTTP-level failure talking to the vision service.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors from the backup store.
#[derive(Error, Debug)]
pub enum BackupError {
    /// Copying the source file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The copy landed but its size does not match the original.
    #[error("backup verification failed for '{file}': sizes do not match ({expected} vs {actual})")]
    Verification {
        file: String,
        expected: u64,
        actual: u64,
    },
}

/// Result type for the recibo library.
pub type Result<T> = std::result::Result<T, ReciboError>;
