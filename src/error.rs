//! Error types for pisearch.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! is the [`PiSearchError`] enum. Errors are never retried internally; a
//! query cursor that returned an error should be dropped.
//!
//! # Examples
//!
//! ```
//! use pisearch::error::{PiSearchError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PiSearchError::invalid_pattern("3.14"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for pisearch operations.
#[derive(Error, Debug)]
pub enum PiSearchError {
    /// I/O errors on the index file or the digit stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Allocation failure or a value that does not fit the on-disk widths.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Truncated or corrupt index file.
    #[error("Malformed index: {0}")]
    MalformedIndex(String),

    /// Query pattern that is empty or contains non-digit characters.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Rejected configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with PiSearchError.
pub type Result<T> = std::result::Result<T, PiSearchError>;

impl PiSearchError {
    /// Create a new resource exhausted error.
    pub fn resource_exhausted<S: Into<String>>(msg: S) -> Self {
        PiSearchError::ResourceExhausted(msg.into())
    }

    /// Create a new malformed index error.
    pub fn malformed_index<S: Into<String>>(msg: S) -> Self {
        PiSearchError::MalformedIndex(msg.into())
    }

    /// Create a new invalid pattern error.
    pub fn invalid_pattern<S: Into<String>>(msg: S) -> Self {
        PiSearchError::InvalidPattern(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PiSearchError::InvalidConfig(msg.into())
    }

    /// Map an unexpected end of file to [`PiSearchError::MalformedIndex`],
    /// leaving every other error untouched.
    pub fn eof_as_malformed<S: Into<String>>(self, what: S) -> Self {
        match self {
            PiSearchError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                PiSearchError::MalformedIndex(format!(
                    "unexpected end of file reading {}",
                    what.into()
                ))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = PiSearchError::malformed_index("offset table truncated");
        assert_eq!(error.to_string(), "Malformed index: offset table truncated");

        let error = PiSearchError::invalid_pattern("3.14");
        assert_eq!(error.to_string(), "Invalid pattern: 3.14");

        let error = PiSearchError::resource_exhausted("bucket lists");
        assert_eq!(error.to_string(), "Resource exhausted: bucket lists");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = PiSearchError::from(io_error);

        match error {
            PiSearchError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_eof_as_malformed() {
        let eof = PiSearchError::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(
            eof.eof_as_malformed("offset table"),
            PiSearchError::MalformedIndex(_)
        ));

        let denied = PiSearchError::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(
            denied.eof_as_malformed("offset table"),
            PiSearchError::Io(_)
        ));
    }
}
