//! Error types for flowconf

use crate::validator::ValidationReport;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for flowconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for flowconf
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Load Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read settings source '{path}': {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings document ({origin}): {reason}")]
    MalformedDocument { origin: String, reason: String },

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("Setting '{0}' is already registered")]
    DuplicateKey(String),

    #[error("Invalid schema entry '{path}': {reason}")]
    InvalidSchema { path: String, reason: String },

    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Validation(ValidationReport),

    #[error("Type mismatch for {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to deserialize settings: {0}")]
    Deserialize(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Settings store is already initialized; use reload to replace the snapshot")]
    AlreadyInitialized,

    #[error("Settings store not initialized")]
    NotInitialized,
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::UnknownKey(_) | Error::SourceUnreadable { .. })
    }

    /// Check if this error carries an aggregated validation report
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Whether the process should refuse to start when this error surfaces
    /// during the initial load.
    #[must_use]
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            Error::SourceUnreadable { .. }
                | Error::MalformedDocument { .. }
                | Error::Validation(_)
                | Error::InvalidSchema { .. }
                | Error::DuplicateKey(_)
        )
    }

    /// Borrow the validation report, if this is a validation failure
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Error::Validation(report) => Some(report),
            _ => None,
        }
    }

    pub(crate) fn malformed(origin: impl Into<String>, reason: impl ToString) -> Self {
        Error::MalformedDocument {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidSchema {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Read a file to string with proper error handling
pub fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::SourceUnreadable {
        path: path.to_path_buf(),
        source: e,
    })
}
