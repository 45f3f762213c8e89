//! Error types for the hexglitch-core library.
//!
//! Validation failures are kept separate from I/O failures so callers can
//! surface the former to the user and keep their current state.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hexglitch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all hexglitch operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Malformed or out-of-range user input
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the offending input field
        field: &'static str,
        /// What was wrong and what format is expected
        reason: String,
    },

    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreate {
        /// Path to the directory that failed to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Input file extension is not an accepted image type
    #[error("unsupported file type '{path}' (supported: {allowed})")]
    UnsupportedExtension {
        /// The rejected path
        path: PathBuf,
        /// Comma separated list of accepted extensions
        allowed: String,
    },

    /// Input file exceeds the configured size cap
    #[error("file '{path}' is too large: {size} bytes (maximum {max} bytes)")]
    FileTooLarge {
        /// The rejected path
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured maximum in bytes
        max: u64,
    },

    /// Refused to write into a protected system directory
    #[error("refusing to write into system directory: '{path}'")]
    ProtectedPath {
        /// The rejected path
        path: PathBuf,
    },

    /// Output file already exists and overwriting was not requested
    #[error("file already exists: '{path}'")]
    FileExists {
        /// The existing path
        path: PathBuf,
    },
}

impl Error {
    /// Creates a new validation error for the named field
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates a new protected path error
    pub fn protected_path(path: impl Into<PathBuf>) -> Self {
        Self::ProtectedPath { path: path.into() }
    }

    /// Returns the offending field name for validation errors
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns true if the caller can report this error and keep its state
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::UnsupportedExtension { .. }
                | Self::FileTooLarge { .. }
                | Self::ProtectedPath { .. }
                | Self::FileExists { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::protected_path("/etc/passwd");
        assert!(err.to_string().contains("system directory"));
        assert!(err.to_string().contains("/etc/passwd"));

        let err = Error::validation("find", "contains invalid hex character 'Z'");
        assert_eq!(
            err.to_string(),
            "invalid find: contains invalid hex character 'Z'"
        );
    }

    #[test]
    fn test_field() {
        assert_eq!(Error::validation("intensity", "x").field(), Some("intensity"));
        assert_eq!(Error::protected_path("/etc").field(), None);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::validation("mode", "unknown").is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(!Error::file_read("/tmp/x", io).is_recoverable());
    }
}
