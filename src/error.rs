//! Error types for range-forge operations.
//!
//! All fallible operations in the crate return [`Result`]. Configuration
//! errors are reported before any data is touched; data and construction
//! errors are fatal, since a silently wrong answer is worse than failing.

use std::io;
use thiserror::Error;

/// Result type alias using [`RangeForgeError`].
pub type Result<T> = std::result::Result<T, RangeForgeError>;

/// Errors that can occur during index construction, search, and persistence.
#[derive(Error, Debug)]
pub enum RangeForgeError {
    /// Vector dimensions do not match the expected dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected vector dimension.
        expected: usize,
        /// Actual vector dimension provided.
        actual: usize,
    },

    /// Operation requires a non-empty dataset but received empty input.
    #[error("empty dataset: operation requires at least one point")]
    EmptyDataset,

    /// Invalid parameter value provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Two parallel inputs disagree on how many entries they carry.
    #[error("count mismatch for {what}: expected {expected}, got {actual}")]
    CountMismatch {
        /// What was being counted (e.g. "attributes", "query ranges").
        what: String,
        /// Expected entry count.
        expected: usize,
        /// Actual entry count found.
        actual: usize,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during serialization or deserialization.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Checksum verification failed during file loading.
    #[error("checksum mismatch: file may be corrupted")]
    ChecksumMismatch,

    /// Index file has an invalid or unrecognized format.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),
}

impl RangeForgeError {
    /// Creates a new `DimensionMismatch` error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Creates a new `InvalidParameter` error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Creates a new `CountMismatch` error.
    pub fn count_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::CountMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Creates a new `SerializationError`.
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Creates a new `InvalidFormat` error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

impl From<bincode::Error> for RangeForgeError {
    fn from(err: bincode::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RangeForgeError::dimension_mismatch(128, 64);
        assert_eq!(err.to_string(), "dimension mismatch: expected 128, got 64");

        let err = RangeForgeError::count_mismatch("attributes", 1000, 999);
        assert_eq!(
            err.to_string(),
            "count mismatch for attributes: expected 1000, got 999"
        );

        let err = RangeForgeError::EmptyDataset;
        assert_eq!(
            err.to_string(),
            "empty dataset: operation requires at least one point"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: RangeForgeError = io_err.into();
        assert!(matches!(err, RangeForgeError::Io(_)));
    }
}
