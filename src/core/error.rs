//! Error types for variant-aliases
//!
//! Run-level errors abort a conversion; row-level errors skip a single row.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a conversion run
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Input file does not exist
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Input or output file not accessible
    #[error("Permission denied accessing {0}")]
    PermissionDenied(PathBuf),

    /// Output path resolves to the input file
    #[error("Output file {0} is the input file")]
    OutputIsInput(PathBuf),

    /// Header line problems
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    /// Thread pool could not be created
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Attach the offending path to common I/O failures
    pub fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ConverterError::InputNotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => ConverterError::PermissionDenied(path.into()),
            _ => ConverterError::Io(err),
        }
    }

    /// Like [`ConverterError::from_io`] for files being written
    pub fn from_output_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => ConverterError::PermissionDenied(path.into()),
            _ => ConverterError::Io(err),
        }
    }
}

/// Errors in the header line of an annotation table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The input had no lines at all
    #[error("No header line found")]
    Missing,

    /// The header line is not UTF-8
    #[error("Header line is not valid UTF-8")]
    InvalidUtf8,

    /// One or more required columns are absent
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Unexpected problems with a single row
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// A field holds bytes that are not UTF-8
    #[error("Invalid UTF-8 in column {column}")]
    InvalidUtf8 { column: &'static str },

    /// ALT splits into no alleles (`,` or whitespace between commas)
    #[error("No alternate allele in ALT field '{alt}'")]
    NoAltAllele { alt: String },
}

/// Result type alias for conversion runs
pub type Result<T> = std::result::Result<T, ConverterError>;

/// Result type alias for row processing
pub type RowResult<T> = std::result::Result<T, RowError>;
