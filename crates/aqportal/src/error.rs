//! Error types for aqportal.
//!
//! Most data problems never become errors: malformed collection files load
//! as empty and bad numbers coerce to zero. What remains here are failures
//! to write the data directory, bad configuration, rejected bulk imports and
//! the console running out of input.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for aqportal operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a collection file.
    #[error("failed to write collection {path}: {source}")]
    CollectionWrite {
        /// Path of the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Import Errors ===
    /// The bulk import file does not exist.
    #[error("file not found: {path}")]
    ImportNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The bulk import file has an extension we cannot read.
    #[error("unsupported file type '{extension}'. Use .json or .csv")]
    ImportUnsupported {
        /// The offending extension (may be empty).
        extension: String,
    },

    /// The bulk import file was readable but not in the expected shape.
    #[error("import failed: {message}")]
    ImportFormat {
        /// Description of the problem.
        message: String,
    },

    // === Console Errors ===
    /// Standard input reached end of file.
    #[error("input closed")]
    InputClosed,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A specialized Result type for aqportal operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a config validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an import format error.
    #[must_use]
    pub fn import_format(message: impl Into<String>) -> Self {
        Self::ImportFormat {
            message: message.into(),
        }
    }

    /// Check if this error means the console has no more input.
    #[must_use]
    pub fn is_input_closed(&self) -> bool {
        matches!(self, Self::InputClosed)
    }
}
