//! Error types for spreadsheet ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Underlying cause of a parse failure.
#[derive(Debug, Error)]
pub enum ParseCause {
    #[error(transparent)]
    Workbook(#[from] calamine::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Errors that can occur while loading a spreadsheet or reading its values.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Extension is not a supported spreadsheet format.
    #[error("unsupported file format: {path} (expected csv, xlsx, xlsm, xlsb, xls or ods)")]
    UnsupportedFormat { path: PathBuf },

    /// Failed to read file metadata.
    #[error("failed to read file {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// File content could not be parsed.
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseCause,
    },

    /// Workbook contains no sheets.
    #[error("workbook has no sheets: {path}")]
    NoSheets { path: PathBuf },

    // === Lookup Errors ===
    /// Requested sheet is not in the workbook.
    #[error("sheet '{sheet}' not found (available: {})", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    /// Requested column is not among the visible headers.
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error(transparent)]
    Model(#[from] remap_model::ModelError),
}

impl IngestError {
    pub(crate) fn parse(path: &std::path::Path, source: impl Into<ParseCause>) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
