//! Error types for ghg-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ghg-core
///
/// Only I/O and lookup boundaries produce errors; the emission formulas
/// themselves are total functions and never fail.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed factor table
    #[error("invalid factor table '{path}': {message}")]
    InvalidFactorTable { path: PathBuf, message: String },

    /// CSV error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV error with no file context (in-memory writers)
    #[error("CSV error: {0}")]
    CsvWrite(#[from] csv::Error),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// No factor table found for a sector
    #[error("no factor table found for sector '{0}'")]
    SectorNotFound(String),

    /// Unsupported factor table file extension
    #[error("unsupported factor table format '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),

    /// Edit addressed to a row that does not exist
    #[error("no combination row with key '{0}'")]
    RowNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
