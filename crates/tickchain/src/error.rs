//! Error types for sessions, export, and file verification.

use std::path::PathBuf;

use thiserror::Error;
use tickchain_crypto::ChainIntegrityError;

/// A row of an exported file could not be read back.
///
/// `row` is the 1-based data row, or 0 for the header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record at row {row}, field `{field}`: {reason}")]
pub struct MalformedRecordError {
    pub row: usize,
    pub field: String,
    pub reason: String,
}

impl MalformedRecordError {
    pub fn new(row: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Session and storage errors.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error tied to a specific file.
    #[error("IO error on {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An exported file did not parse.
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),

    /// Chain replay found a stamp that does not match.
    #[error(transparent)]
    ChainIntegrity(#[from] ChainIntegrityError),

    /// Export was requested for a session with no records.
    #[error("nothing to export")]
    NothingToExport,
}

impl Error {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

/// Result type for tickchain operations.
pub type Result<T> = std::result::Result<T, Error>;
