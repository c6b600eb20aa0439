//! Output error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    /// The destination is the file being transformed.
    #[error("refusing to overwrite the source file {path}")]
    SameAsSource { path: PathBuf },

    /// Destination extension is neither csv nor xlsx.
    #[error("cannot write {path}: output must be .csv or .xlsx")]
    UnsupportedFormat { path: PathBuf },

    /// The active sheet is not among the sheets to write.
    #[error("sheet '{sheet}' is not part of the output")]
    MissingSheet { sheet: String },

    /// A cell lies beyond what the output format can address.
    #[error("sheet '{sheet}' exceeds the worksheet limits at row {row}, column {column}")]
    Capacity {
        sheet: String,
        row: usize,
        column: usize,
    },

    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to replace {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode CSV")]
    Csv(#[from] csv::Error),

    #[error("failed to build workbook")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, WriteError>;
